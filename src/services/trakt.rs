//! Trakt API client.
//!
//! Every call is authenticated with the current bearer token and retried on
//! failure: HTTP 429 waits for `Retry-After` plus a margin, any other error
//! status waits a fixed delay. Both share one retry budget.

use super::token::TokenSource;
use crate::core::cache::{calendar_key, show_progress_key, ResponseCache};
use crate::core::calendar::CalendarWindow;
use crate::models::config::ListMediaType;
use crate::models::kind::MediaVariant;
use crate::utils::json::{deserialize_json, is_int_like};
use crate::{Error, Result};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

const TRAKT_API_HOST: &str = "https://api.trakt.tv";
const TRAKT_API_VERSION: &str = "2";

/// Retry behaviour for failed requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Added to `Retry-After` on HTTP 429.
    pub rate_limit_margin: Duration,
    /// Wait after any other error status.
    pub fallback_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            rate_limit_margin: Duration::from_secs(20),
            fallback_delay: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// How long to wait before retrying a response with this status.
    pub fn wait_for(&self, status: StatusCode, headers: &HeaderMap) -> Duration {
        if status == StatusCode::TOO_MANY_REQUESTS {
            retry_after(headers).unwrap_or_default() + self.rate_limit_margin
        } else {
            self.fallback_delay
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Whether a calendar lists the user's shows or everything on Trakt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarScope {
    /// `calendars/my/...`
    Personal,
    /// `calendars/all/...`
    Global,
}

impl CalendarScope {
    pub fn from_all_medias(all_medias: bool) -> Self {
        if all_medias {
            CalendarScope::Global
        } else {
            CalendarScope::Personal
        }
    }

    pub fn root(&self) -> &'static str {
        match self {
            CalendarScope::Personal => "my",
            CalendarScope::Global => "all",
        }
    }
}

/// Whether a sync endpoint returns watched or collected items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSet {
    Watched,
    Collection,
}

impl SyncSet {
    fn path(&self) -> &'static str {
        match self {
            SyncSet::Watched => "watched",
            SyncSet::Collection => "collection",
        }
    }
}

/// Build the request path of a custom list, or `None` when it must be skipped.
///
/// Private lists live under `users/me`, with watchlist and favorites at
/// their own endpoints. Public lists require a numeric ID.
pub fn list_path(
    template: &str,
    list_id: &str,
    private_list: bool,
    media_type: ListMediaType,
) -> Option<String> {
    let list_id = list_id.trim();
    let mut path = if private_list {
        if matches!(list_id, "watchlist" | "favorites") {
            format!("users/me/{}", list_id)
        } else {
            format!(
                "users/me/{}",
                template.replace("{list_id}", &urlencoding::encode(list_id))
            )
        }
    } else {
        if !is_int_like(list_id) {
            tracing::warn!(
                "Public lists only support numeric List ID, {} is not valid",
                list_id
            );
            return None;
        }
        template.replace("{list_id}", list_id)
    };

    if let Some(suffix) = media_type.path_suffix() {
        path = format!("{}/{}", path, suffix);
    }

    Some(format!("{}?extended=full", path))
}

/// Trakt API client bound to one configured account.
pub struct TraktClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    tokens: Box<dyn TokenSource>,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl TraktClient {
    /// Create a new Trakt client.
    pub fn new(client_id: impl Into<String>, tokens: Box<dyn TokenSource>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: TRAKT_API_HOST.to_string(),
            client_id: client_id.into(),
            tokens,
            retry: RetryPolicy::default(),
            cache: ResponseCache::default(),
        }
    }

    /// Share an existing HTTP connection pool.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point the client at another host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The response cache of this client.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Make an authenticated request and decode the JSON body.
    pub async fn request(&self, method: Method, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let mut retries_left = self.retry.max_retries;

        loop {
            let access_token = self.tokens.access_token().await?;
            tracing::debug!("{} {}", method, url);

            let response = self
                .client
                .request(method.clone(), &url)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", access_token))
                .header("trakt-api-version", TRAKT_API_VERSION)
                .header("trakt-api-key", &self.client_id)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                return deserialize_json(&text);
            }

            let wait = self.retry.wait_for(status, response.headers());
            let body = response.text().await.unwrap_or_default();

            if retries_left == 0 {
                return Err(Error::RetriesExhausted {
                    method: method.to_string(),
                    url,
                    status: status.as_u16(),
                    body,
                });
            }
            retries_left -= 1;

            tracing::warn!(
                "Can't request {} with {} because it returns a {} status code with content {}. \
                 Retrying in {}s, at least {} time(s) left.",
                url,
                method,
                status.as_u16(),
                body,
                wait.as_secs(),
                retries_left
            );
            tokio::time::sleep(wait).await;
        }
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path).await
    }

    /// Check that the credentials are accepted.
    pub async fn verify_credentials(&self) -> Result<Value> {
        self.get("users/settings").await
    }

    /// Fetch one calendar window, served from the cache while fresh.
    pub async fn fetch_calendar(
        &self,
        path: &str,
        window: CalendarWindow,
        scope: CalendarScope,
    ) -> Result<Value> {
        let from_date = window.start_date();
        let key = calendar_key(scope.root(), path, &from_date, window.days);

        if let Some(cached) = self.cache.retrieve(&key) {
            return Ok(cached);
        }

        let response = self
            .get(&format!(
                "calendars/{}/{}/{}/{}",
                scope.root(),
                path,
                from_date,
                window.days
            ))
            .await?;

        self.cache.insert(key, response.clone());
        Ok(response)
    }

    /// Hidden items of one section, shows only.
    pub async fn fetch_hidden_shows(&self, section: &str) -> Result<Value> {
        self.get(&format!("users/hidden/{}?type=show", section)).await
    }

    /// All watched shows without season detail.
    pub async fn fetch_watched_shows(&self) -> Result<Value> {
        self.get("sync/watched/shows?extended=noseasons").await
    }

    /// Watched progress of a show, served from the cache while fresh.
    pub async fn fetch_show_progress(&self, show_id: u64) -> Result<Value> {
        let key = show_progress_key(show_id);

        if let Some(cached) = self.cache.retrieve(&key) {
            return Ok(cached);
        }

        let response = self
            .get(&format!("shows/{}/progress/watched", show_id))
            .await?;

        self.cache.insert(key, response.clone());
        Ok(response)
    }

    /// Full details of one episode.
    pub async fn fetch_episode(&self, show_id: u64, season: u64, number: u64) -> Result<Value> {
        self.get(&format!(
            "shows/{}/seasons/{}/episodes/{}?extended=full",
            show_id, season, number
        ))
        .await
    }

    /// Personal recommendations.
    pub async fn fetch_recommendations(&self, path: &str, limit: usize) -> Result<Value> {
        self.get(&format!(
            "recommendations/{}?limit={}&ignore_collected=false",
            path, limit
        ))
        .await
    }

    /// Most anticipated titles.
    pub async fn fetch_anticipated(
        &self,
        path: &str,
        limit: usize,
        ignore_collected: bool,
    ) -> Result<Value> {
        self.get(&format!(
            "{}/anticipated?limit={}&ignore_collected={}",
            path, limit, ignore_collected
        ))
        .await
    }

    /// Items of a custom list, or `None` if the list definition is unusable.
    pub async fn fetch_list(
        &self,
        template: &str,
        list_id: &str,
        private_list: bool,
        media_type: ListMediaType,
    ) -> Result<Option<Value>> {
        let Some(path) = list_path(template, list_id, private_list, media_type) else {
            return Ok(None);
        };
        self.get(&path).await.map(Some)
    }

    /// Watched or collected items of one media type.
    pub async fn fetch_sync(&self, set: SyncSet, variant: MediaVariant) -> Result<Value> {
        self.get(&format!("sync/{}/{}", set.path(), variant.plural()))
            .await
    }

    /// Profile statistics.
    pub async fn fetch_stats(&self) -> Result<Value> {
        self.get("users/me/stats").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    const TEMPLATE: &str = "lists/{list_id}/items";

    #[test]
    fn test_list_path_private() {
        assert_eq!(
            list_path(TEMPLATE, "my-favs", true, ListMediaType::Any).as_deref(),
            Some("users/me/lists/my-favs/items?extended=full")
        );
        assert_eq!(
            list_path(TEMPLATE, "watchlist", true, ListMediaType::Movie).as_deref(),
            Some("users/me/watchlist/movie?extended=full")
        );
        assert_eq!(
            list_path(TEMPLATE, "favorites", true, ListMediaType::Any).as_deref(),
            Some("users/me/favorites?extended=full")
        );
    }

    #[test]
    fn test_list_path_public() {
        assert_eq!(
            list_path(TEMPLATE, "26885014", false, ListMediaType::Show).as_deref(),
            Some("lists/26885014/items/show?extended=full")
        );
        assert_eq!(list_path(TEMPLATE, "my-list", false, ListMediaType::Any), None);
    }

    #[test]
    fn test_retry_wait() {
        let policy = RetryPolicy::default();
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

        assert_eq!(
            policy.wait_for(StatusCode::TOO_MANY_REQUESTS, &headers),
            Duration::from_secs(27)
        );
        assert_eq!(
            policy.wait_for(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new()),
            Duration::from_secs(20)
        );
        assert_eq!(
            policy.wait_for(StatusCode::BAD_GATEWAY, &headers),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_calendar_scope() {
        assert_eq!(CalendarScope::from_all_medias(true).root(), "all");
        assert_eq!(CalendarScope::from_all_medias(false).root(), "my");
    }
}
