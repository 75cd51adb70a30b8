use std::path::Path;

use tokio::sync::{mpsc, oneshot, watch};

use telly_core::error::CoreError;
use telly_core::models::FavoriteRecord;
use telly_core::storage::Storage;

use crate::store::FavoriteStore;
use crate::RuntimeError;

/// Handle to the favorites database, which runs on its own thread.
///
/// Every successful write republishes the full favorite list on the live
/// channels returned by [`FavoriteStore::live_ids`] and
/// [`FavoriteStore::live_records`].
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
    ids: watch::Receiver<Vec<i64>>,
    records: watch::Receiver<Vec<FavoriteRecord>>,
}

enum DbCommand {
    UpsertFavorite {
        record: FavoriteRecord,
        reply: oneshot::Sender<Result<(), CoreError>>,
    },
    DeleteFavorite {
        item_id: i64,
        reply: oneshot::Sender<Result<(), CoreError>>,
    },
}

/// Sending half of the live favorite channels, owned by the actor.
struct LiveFavorites {
    ids: watch::Sender<Vec<i64>>,
    records: watch::Sender<Vec<FavoriteRecord>>,
}

impl LiveFavorites {
    fn publish(&self, storage: &Storage) {
        match storage.all_favorites() {
            Ok(records) => {
                let ids = records.iter().map(|r| r.item_id).collect();
                self.records.send_replace(records);
                self.ids.send_replace(ids);
            }
            Err(e) => tracing::error!("Failed to reload favorites: {e}"),
        }
    }
}

impl DbHandle {
    pub fn open(path: &Path) -> Result<Self, RuntimeError> {
        let storage = Storage::open(path).map_err(|e| RuntimeError::Database(e.to_string()))?;
        Self::spawn(storage)
    }

    /// Start a handle over an in-memory database.
    pub fn open_memory() -> Result<Self, RuntimeError> {
        let storage = Storage::open_memory().map_err(|e| RuntimeError::Database(e.to_string()))?;
        Self::spawn(storage)
    }

    fn spawn(storage: Storage) -> Result<Self, RuntimeError> {
        let initial = storage
            .all_favorites()
            .map_err(|e| RuntimeError::Database(e.to_string()))?;
        let initial_ids = initial.iter().map(|r| r.item_id).collect();

        let (ids_tx, ids) = watch::channel(initial_ids);
        let (records_tx, records) = watch::channel(initial);
        let live = LiveFavorites {
            ids: ids_tx,
            records: records_tx,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, live, rx))
            .map_err(|e| RuntimeError::Database(format!("failed to spawn DB thread: {e}")))?;

        Ok(Self { tx, ids, records })
    }

    pub async fn upsert_favorite(&self, record: FavoriteRecord) -> Result<(), RuntimeError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::UpsertFavorite { record, reply });
        Self::await_reply(rx).await
    }

    pub async fn delete_favorite(&self, item_id: i64) -> Result<(), RuntimeError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::DeleteFavorite { item_id, reply });
        Self::await_reply(rx).await
    }

    async fn await_reply<T>(rx: oneshot::Receiver<Result<T, CoreError>>) -> Result<T, RuntimeError> {
        match rx.await {
            Ok(result) => result.map_err(|e| RuntimeError::Store(e.to_string())),
            Err(_) => Err(RuntimeError::Store("DB actor closed".into())),
        }
    }
}

impl FavoriteStore for DbHandle {
    async fn upsert(&self, record: FavoriteRecord) -> Result<(), RuntimeError> {
        self.upsert_favorite(record).await
    }

    async fn delete(&self, item_id: i64) -> Result<(), RuntimeError> {
        self.delete_favorite(item_id).await
    }

    fn live_ids(&self) -> watch::Receiver<Vec<i64>> {
        self.ids.clone()
    }

    fn live_records(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.records.clone()
    }
}

fn actor_loop(storage: Storage, live: LiveFavorites, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::UpsertFavorite { record, reply } => {
                let item_id = record.item_id;
                let result = storage.upsert_favorite(&record);
                if result.is_ok() {
                    tracing::info!(item_id, "favorite added");
                    live.publish(&storage);
                }
                let _ = reply.send(result);
            }
            DbCommand::DeleteFavorite { item_id, reply } => {
                let result = storage.delete_favorite(item_id);
                if result.is_ok() {
                    tracing::info!(item_id, "favorite removed");
                    live.publish(&storage);
                }
                let _ = reply.send(result);
            }
        }
    }
    tracing::debug!("db actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> FavoriteRecord {
        FavoriteRecord {
            item_id: id,
            name: format!("Show {id}"),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_writes_are_published_live() {
        let db = DbHandle::open_memory().unwrap();
        let mut ids = db.live_ids();
        let mut records = db.live_records();
        assert!(ids.borrow_and_update().is_empty());

        db.upsert(record(1)).await.unwrap();
        db.upsert(record(2)).await.unwrap();
        ids.changed().await.unwrap();
        assert_eq!(*ids.borrow_and_update(), vec![1, 2]);
        assert_eq!(records.borrow_and_update().len(), 2);

        db.delete(1).await.unwrap();
        ids.changed().await.unwrap();
        assert_eq!(*ids.borrow(), vec![2]);
        assert_eq!(*records.borrow_and_update(), vec![record(2)]);
    }

    #[tokio::test]
    async fn test_live_starts_from_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telly.db");
        {
            let storage = Storage::open(&path).unwrap();
            storage.upsert_favorite(&record(82)).unwrap();
        }

        let db = DbHandle::open(&path).unwrap();
        assert_eq!(*db.live_ids().borrow(), vec![82]);
        assert_eq!(db.live_records().borrow()[0].name, "Show 82");
    }
}
