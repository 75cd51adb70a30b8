use std::collections::HashSet;

use telly_api::{ApiError, CatalogSource};
use telly_core::models::DetailBundle;

/// Fetch an item and its five sub-collections as one unit.
///
/// The six requests run concurrently. The first failure fails the whole
/// bundle; partial results are never returned.
pub async fn fetch_bundle<S: CatalogSource>(source: &S, id: i64) -> Result<DetailBundle, ApiError> {
    let (item, episodes, seasons, cast, crew, images) = futures::try_join!(
        source.get_item(id),
        source.get_episodes(id),
        source.get_seasons(id),
        source.get_cast(id),
        source.get_crew(id),
        source.get_images(id),
    )?;

    Ok(DetailBundle {
        item,
        episodes,
        seasons,
        cast,
        crew,
        images,
    })
}

/// Tracks the published detail bundle and which load is allowed to replace it.
///
/// Each [`begin`](Self::begin) hands out a new token. Only a result carrying
/// the latest token may land; anything older is dropped.
#[derive(Debug, Default)]
pub struct DetailAggregator {
    next_token: u64,
    in_flight: Option<(u64, i64)>,
    current: Option<DetailBundle>,
}

impl DetailAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load cycle for `id`, superseding any earlier one.
    pub fn begin(&mut self, id: i64) -> u64 {
        self.next_token += 1;
        self.in_flight = Some((self.next_token, id));
        self.next_token
    }

    pub fn is_current(&self, token: u64) -> bool {
        matches!(self.in_flight, Some((t, _)) if t == token)
    }

    /// End the current load cycle, installing `bundle` if it succeeded.
    ///
    /// Returns false (and changes nothing) for a stale token.
    pub fn complete(&mut self, token: u64, bundle: Option<DetailBundle>) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.in_flight = None;
        if let Some(bundle) = bundle {
            self.current = Some(bundle);
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn current(&self) -> Option<&DetailBundle> {
        self.current.as_ref()
    }

    /// Clear the published bundle and abandon any load in flight.
    pub fn close(&mut self) {
        self.in_flight = None;
        self.current = None;
    }

    pub fn set_favorite(&mut self, id: i64, favorite: bool) {
        if let Some(bundle) = self.current.as_mut().filter(|b| b.id() == id) {
            bundle.item.is_favorite = favorite;
        }
    }

    pub fn apply_favorite_ids(&mut self, ids: &HashSet<i64>) {
        if let Some(bundle) = self.current.as_mut() {
            bundle.item.is_favorite = ids.contains(&bundle.id());
        }
    }
}
