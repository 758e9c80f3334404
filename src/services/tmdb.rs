//! TMDB API client.
//!
//! Used only to enrich Trakt records with artwork, summaries and trailers.

use crate::models::kind::MediaVariant;
use crate::Result;
use serde::Deserialize;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// API key or Bearer token (JWT)
    pub api_key: String,
    pub language: String,
    /// Whether to use Bearer token authentication (API v4 style)
    pub use_bearer: bool,
}

impl TmdbConfig {
    /// Create a config, detecting v4 bearer tokens.
    pub fn new(api_key: impl Into<String>, language: impl Into<String>) -> Self {
        let api_key = api_key.into();
        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        Self {
            api_key,
            language: language.into(),
            use_bearer,
        }
    }
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
}

/// Genre.
#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub name: String,
}

/// Production company or network.
#[derive(Debug, Clone, Deserialize)]
pub struct Company {
    pub name: Option<String>,
}

/// Movie or TV details.
///
/// Movies fill `title`/`release_date`/`runtime`/`production_companies`,
/// shows fill `name`/`first_air_date`/`networks`. Error payloads simply
/// deserialize to an empty value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaDetails {
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub genres: Option<Vec<Genre>>,
    pub vote_average: Option<f64>,
    pub runtime: Option<u32>,
    pub production_companies: Option<Vec<Company>>,
    pub networks: Option<Vec<Company>>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
}

/// Video list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoList {
    pub results: Vec<Video>,
}

/// One video entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Video {
    pub key: Option<String>,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
}

impl VideoList {
    /// URL of the first YouTube trailer, if any.
    pub fn trailer_url(&self) -> Option<String> {
        self.results.iter().find_map(|video| {
            let is_trailer = video.site.as_deref() == Some("YouTube")
                && video.video_type.as_deref() == Some("Trailer");
            match (&video.key, is_trailer) {
                (Some(key), true) => Some(format!("{}{}", YOUTUBE_WATCH_URL, key)),
                _ => None,
            }
        })
    }
}

fn media_path(variant: MediaVariant) -> &'static str {
    match variant {
        MediaVariant::Movie => "movie",
        MediaVariant::Show => "tv",
    }
}

/// Get poster/backdrop image URL.
pub fn image_url(path: &str) -> String {
    format!("{}/w500{}", TMDB_IMAGE_BASE_URL, path)
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Self {
        let client = reqwest::Client::new();
        Self { config, client }
    }

    /// Create a client sharing an existing HTTP connection pool.
    pub fn with_client(client: reqwest::Client, config: TmdbConfig) -> Self {
        Self { config, client }
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.config.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.config.api_key))
        } else {
            request
        }
    }

    /// Build URL with optional api_key parameter (only for v3 style).
    fn build_url(&self, path: &str) -> String {
        let language = urlencoding::encode(&self.config.language);
        if self.config.use_bearer {
            format!("{}/{}?language={}", TMDB_BASE_URL, path, language)
        } else {
            format!(
                "{}/{}?api_key={}&language={}",
                TMDB_BASE_URL, path, self.config.api_key, language
            )
        }
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = if self.config.use_bearer {
            format!("{}/authentication", TMDB_BASE_URL)
        } else {
            format!(
                "{}/authentication?api_key={}",
                TMDB_BASE_URL, self.config.api_key
            )
        };

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Get movie or TV details.
    pub async fn get_details(&self, variant: MediaVariant, tmdb_id: u64) -> Result<MediaDetails> {
        let url = self.build_url(&format!("{}/{}", media_path(variant), tmdb_id));
        tracing::debug!("TMDB details: {}/{}", media_path(variant), tmdb_id);
        let resp = self.build_request(&url).send().await?.json().await?;
        Ok(resp)
    }

    /// Get movie or TV videos.
    pub async fn get_videos(&self, variant: MediaVariant, tmdb_id: u64) -> Result<VideoList> {
        let url = self.build_url(&format!("{}/{}/videos", media_path(variant), tmdb_id));
        let resp = self.build_request(&url).send().await?.json().await?;
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_detection() {
        assert!(TmdbConfig::new("eyJhbGciOiJIUzI1NiJ9.x.y", "en").use_bearer);
        assert!(!TmdbConfig::new("0123456789abcdef", "en").use_bearer);
    }

    #[test]
    fn test_build_url() {
        let client = TmdbClient::new(TmdbConfig::new("key", "fr-FR"));
        assert_eq!(
            client.build_url("movie/603"),
            "https://api.themoviedb.org/3/movie/603?api_key=key&language=fr-FR"
        );

        let client = TmdbClient::new(TmdbConfig::new("eyJtoken", "en"));
        assert_eq!(
            client.build_url("tv/1399/videos"),
            "https://api.themoviedb.org/3/tv/1399/videos?language=en"
        );
    }

    #[test]
    fn test_trailer_url_picks_first_youtube_trailer() {
        let videos: VideoList = serde_json::from_str(
            r#"{"id": 1, "results": [
                {"site": "Vimeo", "type": "Trailer", "key": "vimeo1"},
                {"site": "YouTube", "type": "Teaser", "key": "teaser1"},
                {"site": "YouTube", "type": "Trailer", "key": null},
                {"site": "YouTube", "type": "Trailer", "key": "abc"},
                {"site": "YouTube", "type": "Trailer", "key": "def"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(
            videos.trailer_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc")
        );
    }

    #[test]
    fn test_trailer_url_none() {
        assert_eq!(VideoList::default().trailer_url(), None);
        let error: VideoList =
            serde_json::from_str(r#"{"success": false, "status_code": 34}"#).unwrap();
        assert_eq!(error.trailer_url(), None);
    }

    #[test]
    fn test_details_from_error_payload() {
        let details: MediaDetails =
            serde_json::from_str(r#"{"success": false, "status_message": "not found"}"#).unwrap();
        assert!(details.title.is_none());
        assert!(details.genres.is_none());
    }
}
