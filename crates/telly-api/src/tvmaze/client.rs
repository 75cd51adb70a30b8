use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use telly_core::models::{CastEntry, CrewEntry, Episode, GalleryImage, Item, Season};

use super::error::ApiError;
use super::types::{
    TvMazeCastCredit, TvMazeCrewCredit, TvMazeEpisode, TvMazeErrorBody, TvMazeGalleryImage,
    TvMazeSearchHit, TvMazeSeason, TvMazeShow,
};
use crate::traits::CatalogSource;

pub const DEFAULT_BASE_URL: &str = "https://api.tvmaze.com";

/// TVmaze REST client. No authentication is needed.
pub struct TvMazeClient {
    base: Url,
    http: Client,
}

impl TvMazeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url).map_err(|e| ApiError::Parse(e.to_string()))?;
        // Endpoints are joined as relative paths, so the base must be a directory.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("telly/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base, http })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let path = resp.url().path().to_string();
        let body = if status == StatusCode::NOT_FOUND {
            String::new()
        } else {
            resp.text().await.unwrap_or_default()
        };
        Err(classify_failure(status, path, body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");

        let resp = self.http.get(url).query(query).send().await?;
        let resp = Self::check_response(resp).await?;
        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Map a non-success response to an [`ApiError`].
fn classify_failure(status: StatusCode, path: String, body: String) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(path);
    }
    let message = serde_json::from_str::<TvMazeErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(body);
    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}

impl CatalogSource for TvMazeClient {
    async fn browse(&self, page: u32) -> Result<Vec<Item>, ApiError> {
        let page = page.to_string();
        let shows: Vec<TvMazeShow> = self.get_json("shows", &[("page", page.as_str())]).await?;
        Ok(shows.into_iter().map(TvMazeShow::into_item).collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<Item>, ApiError> {
        let hits: Vec<TvMazeSearchHit> = self.get_json("search/shows", &[("q", query)]).await?;
        Ok(hits.into_iter().map(|h| h.show.into_item()).collect())
    }

    async fn get_item(&self, id: i64) -> Result<Item, ApiError> {
        let show: TvMazeShow = self.get_json(&format!("shows/{id}"), &[]).await?;
        Ok(show.into_item())
    }

    async fn get_episodes(&self, id: i64) -> Result<Vec<Episode>, ApiError> {
        let episodes: Vec<TvMazeEpisode> =
            self.get_json(&format!("shows/{id}/episodes"), &[]).await?;
        Ok(episodes.into_iter().map(TvMazeEpisode::into_episode).collect())
    }

    async fn get_seasons(&self, id: i64) -> Result<Vec<Season>, ApiError> {
        let seasons: Vec<TvMazeSeason> =
            self.get_json(&format!("shows/{id}/seasons"), &[]).await?;
        Ok(seasons.into_iter().map(TvMazeSeason::into_season).collect())
    }

    async fn get_cast(&self, id: i64) -> Result<Vec<CastEntry>, ApiError> {
        let cast: Vec<TvMazeCastCredit> = self.get_json(&format!("shows/{id}/cast"), &[]).await?;
        Ok(cast.into_iter().map(TvMazeCastCredit::into_cast_entry).collect())
    }

    async fn get_crew(&self, id: i64) -> Result<Vec<CrewEntry>, ApiError> {
        let crew: Vec<TvMazeCrewCredit> = self.get_json(&format!("shows/{id}/crew"), &[]).await?;
        Ok(crew.into_iter().map(TvMazeCrewCredit::into_crew_entry).collect())
    }

    async fn get_images(&self, id: i64) -> Result<Vec<GalleryImage>, ApiError> {
        let images: Vec<TvMazeGalleryImage> =
            self.get_json(&format!("shows/{id}/images"), &[]).await?;
        Ok(images
            .into_iter()
            .map(TvMazeGalleryImage::into_gallery_image)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let client = TvMazeClient::new(DEFAULT_BASE_URL, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint("shows/1/cast").unwrap().as_str(),
            "https://api.tvmaze.com/shows/1/cast"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        for base in ["http://localhost:8080/proxy/", "http://localhost:8080/proxy"] {
            let client = TvMazeClient::new(base, Duration::from_secs(5)).unwrap();
            assert_eq!(
                client.endpoint("search/shows").unwrap().as_str(),
                "http://localhost:8080/proxy/search/shows"
            );
        }
    }

    #[test]
    fn test_bad_base_url_is_parse_error() {
        let err = TvMazeClient::new("not a url", Duration::from_secs(5)).err().unwrap();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn test_not_found_is_classified() {
        let err = classify_failure(StatusCode::NOT_FOUND, "/shows/404".into(), String::new());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: /shows/404");
    }

    #[test]
    fn test_error_body_message_is_used() {
        let body = r#"{"name":"Too Many Requests","message":"Rate limit exceeded.","code":0,"status":429}"#;
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "/shows".into(), body.into());
        assert!(!err.is_not_found());
        assert!(matches!(
            err,
            ApiError::Api { status: 429, ref message } if message == "Rate limit exceeded."
        ));
    }

    #[test]
    fn test_plain_error_body_is_kept() {
        let err = classify_failure(
            StatusCode::BAD_GATEWAY,
            "/shows".into(),
            "upstream down".into(),
        );
        assert_eq!(err.to_string(), "API error (status 502): upstream down");
    }
}
