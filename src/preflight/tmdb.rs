//! TMDB API preflight check.

use super::CheckResult;
use crate::models::config::Configuration;
use crate::services::tmdb::{TmdbClient, TmdbConfig};

/// Check if TMDB API is accessible. Returns `None` when no key is configured.
pub async fn check(config: &Configuration) -> Option<CheckResult> {
    let api_key = config.tmdb.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
    let client = TmdbClient::new(TmdbConfig::new(api_key.trim(), config.language()));

    Some(match client.verify_api_key().await {
        Ok(true) => CheckResult::ok("TMDB API", "connected"),
        Ok(false) => CheckResult::fail(
            "TMDB API",
            "invalid API key",
            "Check tmdb.api_key or the TMDB_API_KEY environment variable",
        ),
        Err(_) => CheckResult::fail(
            "TMDB API",
            "connection failed",
            "Check your network connection",
        ),
    })
}
