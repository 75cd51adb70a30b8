use serde::Deserialize;

use telly_core::models::{
    CastEntry, Character, CrewEntry, Episode, GalleryImage, Image, Item, Person, Season,
};

// ── Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TvMazeImage {
    pub medium: Option<String>,
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeShow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    pub image: Option<TvMazeImage>,
    pub summary: Option<String>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<TvMazeEmbedded>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeEmbedded {
    #[serde(default)]
    pub episodes: Vec<TvMazeEpisode>,
}

/// One hit from `/search/shows`.
#[derive(Debug, Deserialize)]
pub struct TvMazeSearchHit {
    pub score: Option<f64>,
    pub show: TvMazeShow,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeRating {
    pub average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeEpisode {
    pub id: i64,
    pub name: String,
    pub season: u32,
    pub number: Option<u32>,
    pub airdate: Option<String>,
    pub runtime: Option<u32>,
    pub summary: Option<String>,
    pub image: Option<TvMazeImage>,
    pub rating: Option<TvMazeRating>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvMazeSeason {
    pub id: i64,
    pub number: Option<u32>,
    pub episode_order: Option<u32>,
    pub premiere_date: Option<String>,
    pub end_date: Option<String>,
    pub image: Option<TvMazeImage>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazePerson {
    pub id: i64,
    pub name: String,
    pub image: Option<TvMazeImage>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeCastCredit {
    pub person: TvMazePerson,
    pub character: TvMazePerson,
    #[serde(rename = "self")]
    pub is_self: Option<bool>,
    pub voice: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeCrewCredit {
    #[serde(rename = "type")]
    pub job: String,
    pub person: TvMazePerson,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeResolutions {
    pub medium: Option<TvMazeImageUrl>,
    pub original: Option<TvMazeImageUrl>,
}

#[derive(Debug, Deserialize)]
pub struct TvMazeGalleryImage {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub main: Option<bool>,
    pub resolutions: TvMazeResolutions,
}

/// Body of a non-success response, e.g. a 429 rate limit.
#[derive(Debug, Deserialize)]
pub struct TvMazeErrorBody {
    pub name: Option<String>,
    pub message: Option<String>,
}

// ── Conversions ──────────────────────────────────────────────────

impl From<TvMazeImage> for Image {
    fn from(img: TvMazeImage) -> Self {
        Image {
            medium: img.medium,
            original: img.original,
        }
    }
}

impl TvMazeShow {
    pub fn into_item(self) -> Item {
        Item {
            id: self.id,
            name: self.name,
            genres: self.genres,
            image: self.image.map(Image::from),
            summary: self.summary,
            episodes: self
                .embedded
                .map(|e| e.episodes.into_iter().map(TvMazeEpisode::into_episode).collect()),
            // The catalog knows nothing about favorites.
            is_favorite: false,
        }
    }
}

impl TvMazeEpisode {
    pub fn into_episode(self) -> Episode {
        Episode {
            id: self.id,
            name: self.name,
            season: self.season,
            number: self.number,
            airdate: self.airdate.filter(|d| !d.is_empty()),
            runtime: self.runtime,
            summary: self.summary,
            image: self.image.map(Image::from),
            rating: self.rating.and_then(|r| r.average),
        }
    }
}

impl TvMazeSeason {
    pub fn into_season(self) -> Season {
        Season {
            id: self.id,
            number: self.number,
            episode_order: self.episode_order,
            premiere_date: self.premiere_date,
            end_date: self.end_date,
            image: self.image.map(Image::from),
        }
    }
}

impl TvMazePerson {
    fn into_person(self) -> Person {
        Person {
            id: self.id,
            name: self.name,
            image: self.image.map(Image::from),
        }
    }

    fn into_character(self) -> Character {
        Character {
            id: self.id,
            name: self.name,
            image: self.image.map(Image::from),
        }
    }
}

impl TvMazeCastCredit {
    pub fn into_cast_entry(self) -> CastEntry {
        CastEntry {
            person: self.person.into_person(),
            character: self.character.into_character(),
            is_self: self.is_self.unwrap_or(false),
            voice: self.voice.unwrap_or(false),
        }
    }
}

impl TvMazeCrewCredit {
    pub fn into_crew_entry(self) -> CrewEntry {
        CrewEntry {
            person: self.person.into_person(),
            job: self.job,
        }
    }
}

impl TvMazeGalleryImage {
    pub fn into_gallery_image(self) -> GalleryImage {
        GalleryImage {
            id: self.id,
            kind: self.kind,
            main: self.main.unwrap_or(false),
            medium_url: self.resolutions.medium.map(|u| u.url),
            original_url: self.resolutions.original.map(|u| u.url),
        }
    }
}
