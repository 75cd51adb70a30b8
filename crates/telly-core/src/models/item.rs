use serde::{Deserialize, Serialize};

/// Poster artwork in the two sizes the catalog serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub medium: Option<String>,
    pub original: Option<String>,
}

impl Image {
    /// The medium rendition if present, otherwise the original.
    pub fn best_url(&self) -> Option<&str> {
        self.medium.as_deref().or(self.original.as_deref())
    }
}

/// One episode of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub name: String,
    pub season: u32,
    pub number: Option<u32>,
    pub airdate: Option<String>,
    pub runtime: Option<u32>,
    pub summary: Option<String>,
    pub image: Option<Image>,
    pub rating: Option<f64>,
}

/// A catalog entry.
///
/// `is_favorite` is derived state. It is rewritten from the favorite-id set
/// every time the catalog or the set changes and is never read back as a
/// prior value when merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub image: Option<Image>,
    pub summary: Option<String>,
    pub episodes: Option<Vec<Episode>>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Item {
    /// Returns the best available image URL (medium, then original).
    pub fn best_image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Image::best_url)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}
