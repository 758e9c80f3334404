//! Identifiers carried by Trakt records.

use crate::utils::json::{lenient_u64, non_empty_str};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The ID systems a Trakt item may carry. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifiers {
    /// Trakt internal numeric ID.
    pub trakt: Option<u64>,
    /// Trakt URL slug.
    pub slug: Option<String>,
    /// TheTVDB ID.
    pub tvdb: Option<u64>,
    /// IMDb ID (`tt...`).
    pub imdb: Option<String>,
    /// TMDB ID.
    pub tmdb: Option<u64>,
}

impl Identifiers {
    /// Build identifiers from the object that owns an `ids` field.
    ///
    /// A missing `ids` object yields empty identifiers rather than an error.
    pub fn from_trakt(data: &Value) -> Self {
        let ids = data.get("ids");
        let field = |key: &str| ids.and_then(|ids| ids.get(key));

        Self {
            trakt: lenient_u64(field("trakt")),
            slug: non_empty_str(field("slug")),
            tvdb: lenient_u64(field("tvdb")),
            imdb: non_empty_str(field("imdb")),
            tmdb: lenient_u64(field("tmdb")),
        }
    }

    /// Whether this item matches a user-supplied slug or Trakt ID.
    pub fn matches(&self, needle: &str) -> bool {
        self.slug.as_deref() == Some(needle)
            || self.trakt.map(|id| id.to_string()).as_deref() == Some(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_trakt_full() {
        let data = json!({
            "title": "Dark",
            "ids": {"trakt": 1, "slug": "dark", "tvdb": "334824", "imdb": "tt5753856", "tmdb": 70523}
        });
        let ids = Identifiers::from_trakt(&data);
        assert_eq!(ids.trakt, Some(1));
        assert_eq!(ids.slug.as_deref(), Some("dark"));
        assert_eq!(ids.tvdb, Some(334824));
        assert_eq!(ids.imdb.as_deref(), Some("tt5753856"));
        assert_eq!(ids.tmdb, Some(70523));
    }

    #[test]
    fn test_from_trakt_missing_ids() {
        let ids = Identifiers::from_trakt(&json!({"title": "Unknown"}));
        assert_eq!(ids, Identifiers::default());

        let ids = Identifiers::from_trakt(&json!({"ids": {"tmdb": null, "imdb": ""}}));
        assert_eq!(ids.tmdb, None);
        assert_eq!(ids.imdb, None);
    }

    #[test]
    fn test_matches() {
        let ids = Identifiers {
            trakt: Some(99),
            slug: Some("severance".to_string()),
            ..Default::default()
        };
        assert!(ids.matches("severance"));
        assert!(ids.matches("99"));
        assert!(!ids.matches("dark"));
    }
}
