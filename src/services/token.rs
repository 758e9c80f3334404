//! Access token sources.
//!
//! Token issuance and refresh belong to whatever OAuth helper runs the
//! integration. The client only asks for the current token before each call.

use crate::models::config::TraktSettings;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Provides the bearer token for Trakt requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a currently valid access token.
    async fn access_token(&self) -> Result<String>;
}

/// A token fixed for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// A token read from a file that an external OAuth helper keeps fresh.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenSource for TokenFile {
    async fn access_token(&self) -> Result<String> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::TraktTokenUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let token = content.trim();
        if token.is_empty() {
            return Err(Error::TraktTokenUnavailable(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        Ok(token.to_string())
    }
}

/// Pick the token source configured in the settings.
///
/// A token file takes precedence over an inline token.
pub fn token_source_from_settings(settings: &TraktSettings) -> Result<Box<dyn TokenSource>> {
    if let Some(path) = &settings.token_file {
        return Ok(Box::new(TokenFile::new(path.clone())));
    }
    match &settings.access_token {
        Some(token) if !token.trim().is_empty() => Ok(Box::new(StaticToken::new(token.trim()))),
        _ => Err(Error::TraktTokenUnavailable(
            "set TRAKT_ACCESS_TOKEN, trakt.access_token or trakt.token_file".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_token_file_trims() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token");
        std::fs::write(&path, "abc123\n").unwrap();

        assert_eq!(TokenFile::new(&path).access_token().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_token_file_missing() {
        let source = TokenFile::new("/nonexistent/trakt/token");
        assert!(matches!(
            source.access_token().await,
            Err(Error::TraktTokenUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_token_file_is_reread() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("token");
        let source = TokenFile::new(&path);

        tokio::fs::write(&path, "first").await.unwrap();
        assert_eq!(source.access_token().await.unwrap(), "first");

        tokio::fs::write(&path, "second\n").await.unwrap();
        assert_eq!(source.access_token().await.unwrap(), "second");

        tokio::fs::write(&path, "  \n").await.unwrap();
        assert!(matches!(
            source.access_token().await,
            Err(Error::TraktTokenUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_token_source_from_settings() {
        let settings = TraktSettings {
            access_token: Some("inline".to_string()),
            ..Default::default()
        };
        let source = token_source_from_settings(&settings).unwrap();
        assert_eq!(source.access_token().await.unwrap(), "inline");

        assert!(token_source_from_settings(&TraktSettings::default()).is_err());
    }
}
