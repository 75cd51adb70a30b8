//! Runtime for the telly catalog browser.
//!
//! Wires the remote catalog and the persisted favorite store into a single
//! [`Engine`] that owns all view state, and publishes that state as
//! [`ViewState`] snapshots for a front end to render.

mod db;
mod detail;
mod engine;
mod reconciler;
mod store;
#[cfg(test)]
mod testing;
mod view;

use std::sync::Arc;

use telly_api::{ApiError, TvMazeClient};
use telly_core::config::AppConfig;

pub use db::DbHandle;
pub use detail::{fetch_bundle, DetailAggregator};
pub use engine::{Engine, EngineConfig, EngineHandle};
pub use reconciler::FavoriteReconciler;
pub use store::FavoriteStore;
pub use view::ViewState;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{0}")]
    Validation(String),
    #[error("item {0} not found")]
    NotFound(i64),
    #[error("favorite store error: {0}")]
    Store(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
}

impl RuntimeError {
    /// Classify a catalog failure for item `id`.
    pub fn from_api(err: &ApiError, id: i64) -> Self {
        if err.is_not_found() {
            Self::NotFound(id)
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Fully wired application: config, favorite database, catalog client and
/// the engine running over them.
pub struct Runtime {
    config: AppConfig,
    engine: EngineHandle,
}

impl Runtime {
    /// Load config from disk and start everything.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start() -> Result<Self, RuntimeError> {
        let config = AppConfig::load().map_err(|e| RuntimeError::Config(e.to_string()))?;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Result<Self, RuntimeError> {
        let db_path = config
            .ensure_db_path()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        let db = DbHandle::open(&db_path)?;

        let client = TvMazeClient::new(&config.api.base_url, config.api_timeout())
            .map_err(|e| RuntimeError::Config(e.to_string()))?;

        tracing::info!(db = %db_path.display(), api = %config.api.base_url, "starting runtime");
        let engine = Engine::spawn(Arc::new(client), db, EngineConfig::from(&config));

        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}
