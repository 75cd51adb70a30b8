use serde::{Deserialize, Serialize};

use super::item::{Episode, Image, Item};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub number: Option<u32>,
    pub episode_order: Option<u32>,
    pub premiere_date: Option<String>,
    pub end_date: Option<String>,
    pub image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub image: Option<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub image: Option<Image>,
}

/// A performer and the character they play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastEntry {
    pub person: Person,
    pub character: Character,
    /// The performer appears as themselves.
    pub is_self: bool,
    pub voice: bool,
}

/// A crew member and their job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewEntry {
    pub person: Person,
    pub job: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub kind: Option<String>,
    pub main: bool,
    pub medium_url: Option<String>,
    pub original_url: Option<String>,
}

/// Everything the detail screen shows for one item.
///
/// Loaded and replaced as a unit; never patched one sub-collection at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailBundle {
    pub item: Item,
    pub episodes: Vec<Episode>,
    pub seasons: Vec<Season>,
    pub cast: Vec<CastEntry>,
    pub crew: Vec<CrewEntry>,
    pub images: Vec<GalleryImage>,
}

impl DetailBundle {
    pub fn id(&self) -> i64 {
        self.item.id
    }
}
