//! Scripted catalog and in-memory favorite store for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use telly_api::{ApiError, CatalogSource};
use telly_core::models::{
    CastEntry, Character, CrewEntry, Episode, FavoriteRecord, GalleryImage, Image, Item, Person,
    Season,
};

use crate::store::FavoriteStore;
use crate::view::ViewState;
use crate::RuntimeError;

pub fn show(id: i64, name: &str, genres: &[&str]) -> Item {
    Item {
        id,
        name: name.into(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        image: Some(Image {
            medium: Some(format!("https://img/{id}/medium.jpg")),
            original: Some(format!("https://img/{id}/original.jpg")),
        }),
        summary: Some(format!("<p>{name}</p>")),
        episodes: None,
        is_favorite: false,
    }
}

pub fn record(id: i64, name: &str) -> FavoriteRecord {
    FavoriteRecord {
        item_id: id,
        name: name.into(),
        image_url: Some(format!("https://img/{id}/stored.jpg")),
    }
}

/// Wait until the published view satisfies `pred`.
pub async fn settle<P>(rx: &mut watch::Receiver<ViewState>, pred: P) -> ViewState
where
    P: FnMut(&ViewState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(30), rx.wait_for(pred))
        .await
        .expect("timed out waiting for view state")
        .expect("engine stopped")
        .clone()
}

pub fn ids(items: &[Item]) -> Vec<i64> {
    items.iter().map(|i| i.id).collect()
}

// ── Scripted catalog ────────────────────────────────────────────

/// A catalog whose responses and latencies are set by the test.
#[derive(Default)]
pub struct FakeCatalog {
    browse: Mutex<Vec<Item>>,
    browse_fails: AtomicBool,
    searches: Mutex<HashMap<String, (Duration, Vec<Item>)>>,
    details: Mutex<HashMap<i64, (Duration, Item)>>,
    failing_parts: Mutex<HashSet<(i64, &'static str)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_browse(&self, items: Vec<Item>) {
        *self.browse.lock().unwrap() = items;
    }

    pub fn fail_browse(&self, fail: bool) {
        self.browse_fails.store(fail, Ordering::SeqCst);
    }

    pub fn set_search(&self, query: &str, delay: Duration, items: Vec<Item>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), (delay, items));
    }

    pub fn set_detail(&self, item: Item, delay: Duration) {
        self.details.lock().unwrap().insert(item.id, (delay, item));
    }

    /// Make one sub-resource fetch (`"episodes"`, `"cast"`, ...) fail for `id`.
    pub fn fail_part(&self, id: i64, part: &'static str) {
        self.failing_parts.lock().unwrap().insert((id, part));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("search:"))
            .collect()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn part(&self, id: i64, part: &'static str) -> Result<(), ApiError> {
        self.record_call(format!("{part}:{id}"));
        if self.failing_parts.lock().unwrap().contains(&(id, part)) {
            Err(ApiError::Transport(format!("{part} unavailable")))
        } else {
            Ok(())
        }
    }
}

impl CatalogSource for FakeCatalog {
    async fn browse(&self, page: u32) -> Result<Vec<Item>, ApiError> {
        self.record_call(format!("browse:{page}"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        if self.browse_fails.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection reset".into()));
        }
        let items = self.browse.lock().unwrap().clone();
        Ok(items)
    }

    async fn search(&self, query: &str) -> Result<Vec<Item>, ApiError> {
        self.record_call(format!("search:{query}"));
        let scripted = self.searches.lock().unwrap().get(query).cloned();
        let (delay, items) = scripted.unwrap_or((Duration::from_millis(10), Vec::new()));
        tokio::time::sleep(delay).await;
        Ok(items)
    }

    async fn get_item(&self, id: i64) -> Result<Item, ApiError> {
        self.record_call(format!("item:{id}"));
        let scripted = self.details.lock().unwrap().get(&id).cloned();
        let Some((delay, item)) = scripted else {
            return Err(ApiError::NotFound(format!("/shows/{id}")));
        };
        tokio::time::sleep(delay).await;
        Ok(item)
    }

    async fn get_episodes(&self, id: i64) -> Result<Vec<Episode>, ApiError> {
        self.part(id, "episodes")?;
        Ok(vec![Episode {
            id: id * 100,
            name: "Pilot".into(),
            season: 1,
            number: Some(1),
            airdate: None,
            runtime: Some(60),
            summary: None,
            image: None,
            rating: None,
        }])
    }

    async fn get_seasons(&self, id: i64) -> Result<Vec<Season>, ApiError> {
        self.part(id, "seasons")?;
        Ok(vec![Season {
            id: id * 10,
            number: Some(1),
            episode_order: Some(10),
            premiere_date: None,
            end_date: None,
            image: None,
        }])
    }

    async fn get_cast(&self, id: i64) -> Result<Vec<CastEntry>, ApiError> {
        self.part(id, "cast")?;
        Ok(vec![CastEntry {
            person: Person {
                id: 1,
                name: "Mike Vogel".into(),
                image: None,
            },
            character: Character {
                id: 1,
                name: "Barbie".into(),
                image: None,
            },
            is_self: false,
            voice: false,
        }])
    }

    async fn get_crew(&self, id: i64) -> Result<Vec<CrewEntry>, ApiError> {
        self.part(id, "crew")?;
        Ok(Vec::new())
    }

    async fn get_images(&self, id: i64) -> Result<Vec<GalleryImage>, ApiError> {
        self.part(id, "images")?;
        Ok(Vec::new())
    }
}

// ── In-memory favorite store ────────────────────────────────────

struct StoreInner {
    records: Mutex<Vec<FavoriteRecord>>,
    ids_tx: watch::Sender<Vec<i64>>,
    records_tx: watch::Sender<Vec<FavoriteRecord>>,
    fail_writes: AtomicBool,
    write_delay: Duration,
}

/// Favorite store backed by a Vec, emitting on watch channels like the real one.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_records(Vec::new(), Duration::from_millis(5))
    }

    pub fn with_records(records: Vec<FavoriteRecord>, write_delay: Duration) -> Self {
        let ids = records.iter().map(|r| r.item_id).collect();
        let (ids_tx, _) = watch::channel(ids);
        let (records_tx, _) = watch::channel(records.clone());
        Self {
            inner: Arc::new(StoreInner {
                records: Mutex::new(records),
                ids_tx,
                records_tx,
                fail_writes: AtomicBool::new(false),
                write_delay,
            }),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Replace the contents as if another writer had changed them.
    pub fn set_external(&self, records: Vec<FavoriteRecord>) {
        *self.inner.records.lock().unwrap() = records;
        self.publish();
    }

    pub fn ids(&self) -> Vec<i64> {
        self.inner
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.item_id)
            .collect()
    }

    /// Live receivers currently held by anyone other than this store.
    pub fn subscribers(&self) -> usize {
        self.inner.ids_tx.receiver_count() + self.inner.records_tx.receiver_count()
    }

    fn publish(&self) {
        let records = self.inner.records.lock().unwrap().clone();
        let ids = records.iter().map(|r| r.item_id).collect();
        self.inner.records_tx.send_replace(records);
        self.inner.ids_tx.send_replace(ids);
    }

    async fn write(&self, apply: impl FnOnce(&mut Vec<FavoriteRecord>)) -> Result<(), RuntimeError> {
        tokio::time::sleep(self.inner.write_delay).await;
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(RuntimeError::Store("disk full".into()));
        }
        apply(&mut self.inner.records.lock().unwrap());
        self.publish();
        Ok(())
    }
}

impl FavoriteStore for MemoryStore {
    async fn upsert(&self, record: FavoriteRecord) -> Result<(), RuntimeError> {
        self.write(move |records| {
            records.retain(|r| r.item_id != record.item_id);
            records.push(record);
        })
        .await
    }

    async fn delete(&self, item_id: i64) -> Result<(), RuntimeError> {
        self.write(move |records| records.retain(|r| r.item_id != item_id))
            .await
    }

    fn live_ids(&self) -> watch::Receiver<Vec<i64>> {
        self.inner.ids_tx.subscribe()
    }

    fn live_records(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.inner.records_tx.subscribe()
    }
}
