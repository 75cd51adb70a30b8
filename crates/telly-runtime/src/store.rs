use std::future::Future;

use tokio::sync::watch;

use telly_core::models::FavoriteRecord;

use crate::RuntimeError;

/// Durable store of favorite records.
///
/// The live receivers are the only way the engine learns favorite
/// membership. Each starts at the store's current contents and updates after
/// every successful write.
pub trait FavoriteStore: Send + Sync + 'static {
    /// Insert a record, replacing any existing one with the same item id.
    fn upsert(&self, record: FavoriteRecord)
        -> impl Future<Output = Result<(), RuntimeError>> + Send;

    fn delete(&self, item_id: i64) -> impl Future<Output = Result<(), RuntimeError>> + Send;

    fn live_ids(&self) -> watch::Receiver<Vec<i64>>;

    fn live_records(&self) -> watch::Receiver<Vec<FavoriteRecord>>;
}
