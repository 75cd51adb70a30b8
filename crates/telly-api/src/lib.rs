pub mod traits;
pub mod tvmaze;

pub use traits::CatalogSource;
pub use tvmaze::{ApiError, TvMazeClient};
