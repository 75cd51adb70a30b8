pub mod detail;
pub mod favorite;
pub mod item;

pub use detail::{CastEntry, Character, CrewEntry, DetailBundle, GalleryImage, Person, Season};
pub use favorite::FavoriteRecord;
pub use item::{Episode, Image, Item};
