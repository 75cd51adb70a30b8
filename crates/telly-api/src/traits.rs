//! Trait definition for the remote catalog.
//!
//! The engine only talks to the catalog through [`CatalogSource`], so tests
//! can script responses and the HTTP client stays swappable.

use std::future::Future;

use telly_core::models::{CastEntry, CrewEntry, Episode, GalleryImage, Item, Season};

use crate::tvmaze::ApiError;

/// Request/response access to a remote show catalog.
///
/// None of these calls carry favorite information: every returned
/// [`Item`] has `is_favorite == false`.
pub trait CatalogSource: Send + Sync {
    /// One page of the full catalog.
    fn browse(&self, page: u32) -> impl Future<Output = Result<Vec<Item>, ApiError>> + Send;

    /// Items matching a free-text query.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Item>, ApiError>> + Send;

    fn get_item(&self, id: i64) -> impl Future<Output = Result<Item, ApiError>> + Send;

    fn get_episodes(&self, id: i64)
        -> impl Future<Output = Result<Vec<Episode>, ApiError>> + Send;

    fn get_seasons(&self, id: i64) -> impl Future<Output = Result<Vec<Season>, ApiError>> + Send;

    fn get_cast(&self, id: i64) -> impl Future<Output = Result<Vec<CastEntry>, ApiError>> + Send;

    fn get_crew(&self, id: i64) -> impl Future<Output = Result<Vec<CrewEntry>, ApiError>> + Send;

    fn get_images(&self, id: i64)
        -> impl Future<Output = Result<Vec<GalleryImage>, ApiError>> + Send;
}
