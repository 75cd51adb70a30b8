//! Favorite membership as the engine currently believes it.
//!
//! Two copies are kept: what the store last confirmed, and the local view
//! that also includes optimistic toggles. Store emissions overwrite both, so
//! an optimistic guess always converges to the store's answer. A failed
//! write rolls the local view back to the confirmed one.

use std::collections::HashSet;

use telly_core::catalog::CatalogCache;
use telly_core::models::{FavoriteRecord, Item};

#[derive(Debug, Default)]
pub struct FavoriteReconciler {
    confirmed_ids: Vec<i64>,
    confirmed_records: Vec<FavoriteRecord>,
    ids: Vec<i64>,
    id_set: HashSet<i64>,
    records: Vec<FavoriteRecord>,
}

impl FavoriteReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store reported a new id list.
    pub fn on_ids_changed(&mut self, ids: Vec<i64>) {
        self.confirmed_ids = ids.clone();
        self.set_ids(ids);
    }

    /// The store reported a new record list.
    pub fn on_records_changed(&mut self, records: Vec<FavoriteRecord>) {
        self.confirmed_records = records.clone();
        self.records = records;
    }

    /// Predict the store's state after a toggle, ahead of its confirmation.
    pub fn apply_toggle(&mut self, record: FavoriteRecord, favorite: bool) {
        let id = record.item_id;
        self.records.retain(|r| r.item_id != id);
        if favorite {
            if self.id_set.insert(id) {
                self.ids.push(id);
            }
            self.records.push(record);
        } else if self.id_set.remove(&id) {
            self.ids.retain(|i| *i != id);
        }
    }

    /// Drop every optimistic change and return to the last confirmed state.
    pub fn rollback(&mut self) {
        self.records = self.confirmed_records.clone();
        self.set_ids(self.confirmed_ids.clone());
    }

    pub fn id_set(&self) -> &HashSet<i64> {
        &self.id_set
    }

    pub fn contains(&self, id: i64) -> bool {
        self.id_set.contains(&id)
    }

    pub fn record(&self, id: i64) -> Option<&FavoriteRecord> {
        self.records.iter().find(|r| r.item_id == id)
    }

    /// One entry per favorite id, in store order.
    ///
    /// Uses the full catalog item when loaded, else the degraded item built
    /// from the stored record. An id whose record has not arrived yet is
    /// skipped until it does.
    pub fn favorites_view(&self, catalog: &CatalogCache) -> Vec<Item> {
        self.ids
            .iter()
            .filter_map(|&id| {
                if let Some(item) = catalog.get(id) {
                    let mut item = item.clone();
                    item.is_favorite = true;
                    Some(item)
                } else if let Some(record) = self.record(id) {
                    Some(record.to_item())
                } else {
                    tracing::debug!(id, "favorite id has no record yet");
                    None
                }
            })
            .collect()
    }

    fn set_ids(&mut self, ids: Vec<i64>) {
        self.id_set = ids.iter().copied().collect();
        self.ids = ids;
    }
}
