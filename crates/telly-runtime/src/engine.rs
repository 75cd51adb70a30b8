//! The single owner of all view state.
//!
//! [`Engine`] runs as one tokio task. Front-end calls on [`EngineHandle`] and
//! the results of every async operation it starts (catalog fetches, detail
//! fetches, favorite writes, debounce timers, store emissions) arrive as
//! [`Command`]s on one channel and are applied in order, so no state is ever
//! mutated from two places.
//!
//! Async work is never cancelled. Instead each catalog load and detail load
//! carries a token, and a result whose token is no longer the latest is
//! dropped on arrival.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use telly_api::{ApiError, CatalogSource};
use telly_core::catalog::{filtered_view, CatalogCache};
use telly_core::config::AppConfig;
use telly_core::models::{DetailBundle, FavoriteRecord, Item};
use telly_core::search::{DebounceTicket, SearchCoordinator, DEFAULT_MIN_QUERY_LEN};

use crate::detail::{fetch_bundle, DetailAggregator};
use crate::reconciler::FavoriteReconciler;
use crate::store::FavoriteStore;
use crate::view::ViewState;
use crate::RuntimeError;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub browse_page: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            browse_page: 0,
        }
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            debounce: config.debounce(),
            min_query_len: config.search.min_query_len,
            browse_page: config.api.browse_page,
        }
    }
}

#[derive(Debug)]
enum CatalogOrigin {
    Browse,
    Search(String),
}

#[derive(Debug)]
enum Command {
    // ── From the front end ──
    BrowseOrRefresh,
    InputChanged(String),
    SubmitSearch(String),
    SelectGenre(Option<String>),
    ToggleFavorite(Item),
    OpenDetail(i64),
    CloseDetail,
    ClearError,

    // ── From spawned work ──
    DebounceElapsed(DebounceTicket),
    CatalogLoaded {
        token: u64,
        origin: CatalogOrigin,
        result: Result<Vec<Item>, ApiError>,
    },
    DetailLoaded {
        token: u64,
        id: i64,
        result: Result<DetailBundle, ApiError>,
    },
    FavoriteIdsChanged(Vec<i64>),
    FavoriteRecordsChanged(Vec<FavoriteRecord>),
    FavoriteWriteFailed {
        item_id: i64,
        error: RuntimeError,
    },
}

/// Cloneable front-end handle to a running [`Engine`].
///
/// All operations are fire-and-forget; observe their effect through
/// [`subscribe`](Self::subscribe) or [`view`](Self::view).
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<ViewState>,
}

impl EngineHandle {
    /// Reload the catalog's first page (or the configured page).
    pub fn browse_or_refresh(&self) {
        self.send(Command::BrowseOrRefresh);
    }

    /// The search box changed. Searches after the quiet period if the
    /// trimmed text is long enough.
    pub fn input_changed(&self, text: impl Into<String>) {
        self.send(Command::InputChanged(text.into()));
    }

    /// Search immediately, regardless of length. Empty text sets an error.
    pub fn submit_search(&self, text: impl Into<String>) {
        self.send(Command::SubmitSearch(text.into()));
    }

    pub fn select_genre(&self, genre: Option<String>) {
        self.send(Command::SelectGenre(genre));
    }

    /// Flip the favorite state of `item` as it is currently displayed.
    pub fn toggle_favorite(&self, item: Item) {
        self.send(Command::ToggleFavorite(item));
    }

    pub fn open_detail(&self, id: i64) {
        self.send(Command::OpenDetail(id));
    }

    pub fn close_detail(&self) {
        self.send(Command::CloseDetail);
    }

    pub fn clear_error(&self) {
        self.send(Command::ClearError);
    }

    /// The most recently published state.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            tracing::error!("engine task is not running");
        }
    }
}

pub struct Engine<S> {
    source: Arc<S>,
    config: EngineConfig,
    tx: mpsc::WeakUnboundedSender<Command>,
    writes: mpsc::UnboundedSender<FavoriteWrite>,
    view_tx: watch::Sender<ViewState>,
    /// Dropped with the engine, which stops the store pumps.
    _alive: watch::Sender<()>,

    catalog: CatalogCache,
    selected_genre: Option<String>,
    search: SearchCoordinator,
    favorites: FavoriteReconciler,
    detail: DetailAggregator,
    catalog_token: u64,
    catalog_pending: bool,
    has_data: bool,
    error: Option<String>,
}

impl<S> Engine<S>
where
    S: CatalogSource + 'static,
{
    /// Start the engine task and the store subscriptions feeding it.
    ///
    /// Must be called from inside a tokio runtime. The task ends once every
    /// [`EngineHandle`] is dropped and outstanding work has finished.
    pub fn spawn<F: FavoriteStore>(
        source: Arc<S>,
        store: F,
        config: EngineConfig,
    ) -> EngineHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(ViewState::default());
        let (alive, _) = watch::channel(());

        forward(
            store.live_ids(),
            alive.subscribe(),
            tx.downgrade(),
            Command::FavoriteIdsChanged,
        );
        forward(
            store.live_records(),
            alive.subscribe(),
            tx.downgrade(),
            Command::FavoriteRecordsChanged,
        );

        let writes = spawn_writer(store, tx.downgrade());

        let engine = Engine {
            source,
            writes,
            search: SearchCoordinator::new(config.min_query_len),
            config,
            tx: tx.downgrade(),
            view_tx,
            _alive: alive,
            catalog: CatalogCache::new(),
            selected_genre: None,
            favorites: FavoriteReconciler::new(),
            detail: DetailAggregator::new(),
            catalog_token: 0,
            catalog_pending: false,
            has_data: false,
            error: None,
        };
        tokio::spawn(engine.run(rx));

        EngineHandle { tx, view }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd);
            self.publish();
        }
        tracing::debug!("engine stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::BrowseOrRefresh => self.start_browse(),
            Command::InputChanged(text) => {
                if let Some(ticket) = self.search.input_changed(text) {
                    self.arm_debounce(ticket);
                }
            }
            Command::SubmitSearch(text) => match self.search.search_now(text) {
                Ok(query) => self.start_search(query),
                Err(e) => {
                    tracing::debug!("rejected search: {e}");
                    self.error = Some(RuntimeError::Validation(e.to_string()).to_string());
                }
            },
            Command::SelectGenre(genre) => self.selected_genre = genre,
            Command::ToggleFavorite(item) => self.toggle_favorite(&item),
            Command::OpenDetail(id) => self.start_detail(id),
            Command::CloseDetail => self.detail.close(),
            Command::ClearError => self.error = None,
            Command::DebounceElapsed(ticket) => {
                if let Some(query) = self.search.timer_expired(&ticket) {
                    self.start_search(query);
                }
            }
            Command::CatalogLoaded {
                token,
                origin,
                result,
            } => self.on_catalog_loaded(token, origin, result),
            Command::DetailLoaded { token, id, result } => {
                self.on_detail_loaded(token, id, result)
            }
            Command::FavoriteIdsChanged(ids) => {
                tracing::debug!(count = ids.len(), "favorite ids changed");
                self.favorites.on_ids_changed(ids);
                self.refresh_favorite_flags();
            }
            Command::FavoriteRecordsChanged(records) => {
                self.favorites.on_records_changed(records);
            }
            Command::FavoriteWriteFailed { item_id, error } => {
                tracing::warn!(item_id, "favorite write failed: {error}");
                self.favorites.rollback();
                self.refresh_favorite_flags();
                self.error = Some(error.to_string());
            }
        }
    }

    // ── Catalog ─────────────────────────────────────────────────

    fn next_catalog_token(&mut self) -> u64 {
        self.catalog_token += 1;
        self.catalog_pending = true;
        self.error = None;
        self.catalog_token
    }

    fn start_browse(&mut self) {
        let token = self.next_catalog_token();
        let page = self.config.browse_page;
        let source = self.source.clone();
        self.spawn_reporting(async move {
            let result = source.browse(page).await;
            Command::CatalogLoaded {
                token,
                origin: CatalogOrigin::Browse,
                result,
            }
        });
    }

    fn start_search(&mut self, query: String) {
        let token = self.next_catalog_token();
        tracing::debug!(%query, token, "searching");
        let source = self.source.clone();
        self.spawn_reporting(async move {
            let result = source.search(&query).await;
            Command::CatalogLoaded {
                token,
                origin: CatalogOrigin::Search(query),
                result,
            }
        });
    }

    fn arm_debounce(&self, ticket: DebounceTicket) {
        let delay = self.config.debounce;
        self.spawn_reporting(async move {
            tokio::time::sleep(delay).await;
            Command::DebounceElapsed(ticket)
        });
    }

    fn on_catalog_loaded(
        &mut self,
        token: u64,
        origin: CatalogOrigin,
        result: Result<Vec<Item>, ApiError>,
    ) {
        if token != self.catalog_token {
            tracing::debug!(token, latest = self.catalog_token, "discarding stale catalog result");
            return;
        }
        self.catalog_pending = false;

        if let CatalogOrigin::Search(query) = &origin {
            if !self.search.accepts(query) {
                tracing::debug!(%query, "discarding results for superseded query");
                return;
            }
        }

        match result {
            Ok(items) => {
                tracing::info!(count = items.len(), ?origin, "catalog loaded");
                self.catalog.replace(items);
                // Flags applied before the replace belonged to the old snapshot.
                self.catalog.apply_favorite_ids(self.favorites.id_set());
                self.selected_genre = None;
                self.has_data = true;
            }
            Err(e) => {
                tracing::warn!(?origin, "catalog load failed: {e}");
                self.error = Some(RuntimeError::Transport(e.to_string()).to_string());
            }
        }
    }

    // ── Detail ──────────────────────────────────────────────────

    fn start_detail(&mut self, id: i64) {
        let token = self.detail.begin(id);
        self.error = None;
        let source = self.source.clone();
        self.spawn_reporting(async move {
            let result = fetch_bundle(source.as_ref(), id).await;
            Command::DetailLoaded { token, id, result }
        });
    }

    fn on_detail_loaded(&mut self, token: u64, id: i64, result: Result<DetailBundle, ApiError>) {
        let bundle = match result {
            Ok(mut bundle) => {
                // The remote side has no notion of favorites.
                bundle.item.is_favorite = self.favorites.contains(id);
                Some(bundle)
            }
            Err(e) => {
                if self.detail.is_current(token) {
                    tracing::warn!(id, "detail load failed: {e}");
                    self.error = Some(RuntimeError::from_api(&e, id).to_string());
                }
                None
            }
        };
        if !self.detail.complete(token, bundle) {
            tracing::debug!(id, token, "discarding stale detail result");
        }
    }

    // ── Favorites ───────────────────────────────────────────────

    fn toggle_favorite(&mut self, item: &Item) {
        let favorite = !item.is_favorite;
        let record = FavoriteRecord::from_item(item);
        let item_id = item.id;

        self.favorites.apply_toggle(record.clone(), favorite);
        self.catalog.set_favorite(item_id, favorite);
        self.detail.set_favorite(item_id, favorite);

        let write = if favorite {
            FavoriteWrite::Upsert(record)
        } else {
            FavoriteWrite::Delete(item_id)
        };
        if self.writes.send(write).is_err() {
            tracing::error!(item_id, "favorite writer is not running");
        }
    }

    fn refresh_favorite_flags(&mut self) {
        let ids = self.favorites.id_set();
        self.catalog.apply_favorite_ids(ids);
        self.detail.apply_favorite_ids(ids);
    }

    // ── Plumbing ────────────────────────────────────────────────

    /// Run `work` in the background and feed its result back as a command.
    fn spawn_reporting<W>(&self, work: W)
    where
        W: std::future::Future<Output = Command> + Send + 'static,
    {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let _ = tx.send(work.await);
        });
    }

    fn publish(&self) {
        let view = ViewState {
            catalog_view: filtered_view(self.catalog.items(), self.selected_genre.as_deref()),
            favorites_view: self.favorites.favorites_view(&self.catalog),
            detail_view: self.detail.current().cloned(),
            selected_genre: self.selected_genre.clone(),
            genres: self.catalog.genres().to_vec(),
            loading: self.catalog_pending || self.detail.is_loading(),
            error: self.error.clone(),
            has_data: self.has_data,
        };
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}

#[derive(Debug)]
enum FavoriteWrite {
    Upsert(FavoriteRecord),
    Delete(i64),
}

/// Apply favorite writes to the store one at a time, in the order issued.
///
/// Serializing the writes is what makes a rapid favorite/unfavorite pair
/// land in the store in the same order the user made them.
fn spawn_writer<F: FavoriteStore>(
    store: F,
    tx: mpsc::WeakUnboundedSender<Command>,
) -> mpsc::UnboundedSender<FavoriteWrite> {
    let (writes, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(write) = rx.recv().await {
            let (item_id, result) = match write {
                FavoriteWrite::Upsert(record) => (record.item_id, store.upsert(record).await),
                FavoriteWrite::Delete(item_id) => (item_id, store.delete(item_id).await),
            };
            if let Err(error) = result {
                if let Some(tx) = tx.upgrade() {
                    let _ = tx.send(Command::FavoriteWriteFailed { item_id, error });
                }
            }
        }
    });
    writes
}

/// Pump a store's live channel into the engine, starting with its current value.
///
/// Stops when the store closes the channel or the engine drops `alive`.
fn forward<T, W>(
    mut rx: watch::Receiver<T>,
    mut alive: watch::Receiver<()>,
    tx: mpsc::WeakUnboundedSender<Command>,
    wrap: W,
) where
    T: Clone + Send + Sync + 'static,
    W: Fn(T) -> Command + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let value = rx.borrow_and_update().clone();
            let Some(tx) = tx.upgrade() else {
                break;
            };
            if tx.send(wrap(value)).is_err() {
                break;
            }
            drop(tx);
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = alive.changed() => break,
            }
        }
    });
}
