//! The canonical in-memory catalog and the views derived from it.
//!
//! [`CatalogCache`] owns the most recent browse/search result set. Everything
//! shown to the user (filtered list, genre facets, favorite flags) is derived
//! from it, so there is one copy of each item rather than several kept in sync.

use std::collections::HashSet;

use crate::models::Item;

/// The last successful browse/search result plus its genre facets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogCache {
    items: Vec<Item>,
    genres: Vec<String>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new snapshot, recomputing genre facets in the same step.
    ///
    /// Favorite flags on the incoming items are reset: the caller must run
    /// [`apply_favorite_ids`](Self::apply_favorite_ids) right after, since any
    /// earlier application was made against the replaced snapshot.
    pub fn replace(&mut self, items: Vec<Item>) -> &[String] {
        self.genres = genre_facets(&items);
        self.items = items;
        for item in &mut self.items {
            item.is_favorite = false;
        }
        &self.genres
    }

    /// Rewrite every `is_favorite` flag by membership in `ids`.
    ///
    /// Touches no other field and is idempotent.
    pub fn apply_favorite_ids(&mut self, ids: &HashSet<i64>) {
        for item in &mut self.items {
            item.is_favorite = ids.contains(&item.id);
        }
    }

    /// Set the flag on a single item. Returns false if the id is not loaded.
    pub fn set_favorite(&mut self, id: i64, favorite: bool) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.is_favorite = favorite;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }
}

/// Distinct genres across `items`, in first-seen order.
pub fn genre_facets(items: &[Item]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .flat_map(|i| i.genres.iter())
        .filter(|g| seen.insert(g.as_str()))
        .cloned()
        .collect()
}

/// Items whose genres contain `genre`, in snapshot order.
///
/// `None` selects everything. A genre absent from the snapshot yields an
/// empty list.
pub fn filtered_view(items: &[Item], genre: Option<&str>) -> Vec<Item> {
    match genre {
        None => items.to_vec(),
        Some(genre) => items.iter().filter(|i| i.has_genre(genre)).cloned().collect(),
    }
}
