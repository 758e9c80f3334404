//! Error types for the Trakt integration.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Trakt integration.
#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Trakt client ID not configured. Set TRAKT_CLIENT_ID or trakt.client_id")]
    TraktClientIdMissing,

    #[error("Trakt access token unavailable: {0}")]
    TraktTokenUnavailable(String),

    // Upstream errors
    #[error(
        "Can't request {url} with {method} because it returns a {status} status code with content {body}. \
         Too many retries, giving up."
    )]
    RetriesExhausted {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Can't deserialize the following json:\n{0}")]
    MalformedJson(String),

    #[error("Can't extract the value from the following path: {0}")]
    MissingField(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Refresh errors
    #[error("Refresh timed out after {0} seconds")]
    RefreshTimeout(u64),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
