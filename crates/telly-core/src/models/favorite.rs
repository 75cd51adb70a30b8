use serde::{Deserialize, Serialize};

use super::item::{Image, Item};

/// Reduced snapshot of an item taken when it was favorited.
///
/// Carries just enough to render a favorites entry when the full item is
/// not in the loaded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub item_id: i64,
    pub name: String,
    pub image_url: Option<String>,
}

impl FavoriteRecord {
    pub fn from_item(item: &Item) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            image_url: item.best_image_url().map(str::to_owned),
        }
    }

    /// Build the degraded item shown when the catalog has no full copy.
    pub fn to_item(&self) -> Item {
        Item {
            id: self.item_id,
            name: self.name.clone(),
            genres: Vec::new(),
            image: self.image_url.as_ref().map(|url| Image {
                medium: Some(url.clone()),
                original: Some(url.clone()),
            }),
            summary: None,
            episodes: None,
            is_favorite: true,
        }
    }
}
