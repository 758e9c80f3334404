//! Configuration model.
//!
//! The settings file mirrors the nested `source -> group -> field` layout the
//! sensors are configured with. It is only ever read; every refresh loads a
//! fresh snapshot from disk.

use super::kind::{TraktKind, NEXT_TO_WATCH_KINDS};
use crate::utils::json::is_int_like;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_UPDATE_INTERVAL: u64 = 8;
pub const DEFAULT_REFRESH_TIMEOUT: u64 = 1800;
pub const DEFAULT_DAYS_TO_FETCH: u32 = 30;
pub const DEFAULT_MAX_MEDIAS: usize = 3;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Preferred language for TMDB metadata.
    pub language: String,
    /// Minutes between two refreshes.
    pub update_interval: u64,
    /// Upper bound in seconds for one refresh.
    pub refresh_timeout: u64,
    /// Trakt credentials.
    pub trakt: TraktSettings,
    /// TMDB credentials.
    pub tmdb: TmdbSettings,
    /// Sensor definitions.
    pub sensors: SensorsConfig,
}

/// Trakt credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraktSettings {
    /// Application client ID, sent as `trakt-api-key`.
    pub client_id: Option<String>,
    /// OAuth access token.
    pub access_token: Option<String>,
    /// File holding the current access token, re-read before each request.
    pub token_file: Option<PathBuf>,
}

/// TMDB credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbSettings {
    /// API key (v3) or bearer token (v4).
    pub api_key: Option<String>,
}

/// Per-group sensor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSettings {
    pub enabled: bool,
    pub days_to_fetch: u32,
    pub max_medias: usize,
    pub exclude: Vec<String>,
    pub exclude_collected: bool,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            days_to_fetch: DEFAULT_DAYS_TO_FETCH,
            max_medias: DEFAULT_MAX_MEDIAS,
            exclude: Vec::new(),
            exclude_collected: false,
        }
    }
}

/// Media type filter for lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMediaType {
    #[default]
    Any,
    Movie,
    Show,
    Episode,
}

impl ListMediaType {
    /// Path suffix restricting the list to one type.
    pub fn path_suffix(&self) -> Option<&'static str> {
        match self {
            ListMediaType::Any => None,
            ListMediaType::Movie => Some("movie"),
            ListMediaType::Show => Some("show"),
            ListMediaType::Episode => Some("episode"),
        }
    }
}

/// Sort key for lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSortBy {
    #[default]
    Rank,
    Rating,
}

/// Sort direction for lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One custom list sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Unique display name.
    pub friendly_name: String,
    /// Numeric ID, slug, `watchlist` or `favorites`.
    pub list_id: String,
    #[serde(default)]
    pub private_list: bool,
    #[serde(default)]
    pub media_type: ListMediaType,
    #[serde(default = "default_max_medias")]
    pub max_medias: usize,
    #[serde(default)]
    pub sort_by: ListSortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub exclude_collected: bool,
    #[serde(default)]
    pub only_released: bool,
}

fn default_max_medias() -> usize {
    DEFAULT_MAX_MEDIAS
}

/// All sensor sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub upcoming: BTreeMap<String, GroupSettings>,
    pub all_upcoming: BTreeMap<String, GroupSettings>,
    pub next_to_watch: BTreeMap<String, GroupSettings>,
    pub recommendation: BTreeMap<String, GroupSettings>,
    pub anticipated: BTreeMap<String, GroupSettings>,
    pub stats: BTreeMap<String, GroupSettings>,
    pub lists: Vec<ListConfig>,
}

impl SensorsConfig {
    fn groups(&self, source: &str) -> Option<&BTreeMap<String, GroupSettings>> {
        match source {
            "upcoming" => Some(&self.upcoming),
            "all_upcoming" => Some(&self.all_upcoming),
            "next_to_watch" => Some(&self.next_to_watch),
            "recommendation" => Some(&self.recommendation),
            "anticipated" => Some(&self.anticipated),
            "stats" => Some(&self.stats),
            _ => None,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            trakt: TraktSettings::default(),
            tmdb: TmdbSettings::default(),
            sensors: SensorsConfig::default(),
        }
    }
}

impl Configuration {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Configuration = toml::from_str(content)?;
        Ok(config)
    }

    /// Preferred language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Interval between refreshes.
    pub fn update_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.update_interval.max(1) * 60)
    }

    /// Look up a group, accepting the `next_to_watch_` prefixed spelling.
    fn group(&self, identifier: &str, source: &str) -> Option<&GroupSettings> {
        let groups = self.sensors.groups(source)?;
        groups.get(identifier).or_else(|| {
            if source == "next_to_watch" {
                groups.get(&format!("next_to_watch_{}", identifier))
            } else {
                None
            }
        })
    }

    fn group_or_default(&self, identifier: &str, source: &str) -> GroupSettings {
        self.group(identifier, source).cloned().unwrap_or_default()
    }

    /// True if the source has something effectively enabled.
    ///
    /// Group sources need at least one enabled group; lists need one definition.
    pub fn source_exists(&self, source: &str) -> bool {
        if source == "lists" {
            return !self.sensors.lists.is_empty();
        }
        self.sensors
            .groups(source)
            .is_some_and(|groups| groups.values().any(|g| g.enabled))
    }

    /// True if the group exists and is enabled.
    pub fn identifier_exists(&self, identifier: &str, source: &str) -> bool {
        self.group(identifier, source).is_some_and(|g| g.enabled)
    }

    /// Enabled kinds of a source, in a stable order.
    pub fn kinds(&self, source: &str) -> Vec<TraktKind> {
        let Some(groups) = self.sensors.groups(source) else {
            return Vec::new();
        };

        let mut kinds: Vec<TraktKind> = groups
            .iter()
            .filter(|(_, g)| g.enabled)
            .filter_map(|(identifier, _)| TraktKind::from_identifier(identifier, source))
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub fn days_to_fetch(&self, identifier: &str, source: &str) -> u32 {
        self.group_or_default(identifier, source).days_to_fetch
    }

    pub fn max_medias(&self, identifier: &str, source: &str) -> usize {
        self.group_or_default(identifier, source).max_medias
    }

    pub fn exclude_items(&self, identifier: &str, source: &str) -> Vec<String> {
        self.group_or_default(identifier, source).exclude
    }

    pub fn exclude_collected(&self, identifier: &str, source: &str) -> bool {
        self.group_or_default(identifier, source).exclude_collected
    }

    fn upcoming_source(all_medias: bool) -> &'static str {
        if all_medias {
            "all_upcoming"
        } else {
            "upcoming"
        }
    }

    pub fn upcoming_identifier_exists(&self, identifier: &str, all_medias: bool) -> bool {
        self.identifier_exists(identifier, Self::upcoming_source(all_medias))
    }

    pub fn upcoming_days_to_fetch(&self, identifier: &str, all_medias: bool) -> u32 {
        self.days_to_fetch(identifier, Self::upcoming_source(all_medias))
    }

    pub fn upcoming_max_medias(&self, identifier: &str, all_medias: bool) -> usize {
        self.max_medias(identifier, Self::upcoming_source(all_medias))
    }

    /// Custom list definitions.
    pub fn lists(&self) -> &[ListConfig] {
        &self.sensors.lists
    }

    /// Whether a flattened stat key should become a sensor.
    pub fn stats_key_exists(&self, key: &str) -> bool {
        self.identifier_exists(key, "stats")
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_timeout == 0 {
            return Err(Error::InvalidConfig(
                "refresh_timeout must be at least 1 second".into(),
            ));
        }

        let mut names = HashSet::new();
        for list in &self.sensors.lists {
            if list.friendly_name.trim().is_empty() {
                return Err(Error::InvalidConfig("list friendly_name is empty".into()));
            }
            if !names.insert(list.friendly_name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "a list named '{}' already exists",
                    list.friendly_name
                )));
            }
            if !list.private_list && !is_int_like(&list.list_id) {
                return Err(Error::InvalidConfig(format!(
                    "public list '{}' needs a numeric list_id, got '{}'",
                    list.friendly_name, list.list_id
                )));
            }
            if list.max_medias == 0 {
                return Err(Error::InvalidConfig(format!(
                    "list '{}' max_medias must be at least 1",
                    list.friendly_name
                )));
            }
        }

        for source in [
            "upcoming",
            "all_upcoming",
            "next_to_watch",
            "recommendation",
            "anticipated",
        ] {
            let Some(groups) = self.sensors.groups(source) else {
                continue;
            };
            for (identifier, group) in groups {
                if group.max_medias == 0 {
                    return Err(Error::InvalidConfig(format!(
                        "{}.{} max_medias must be at least 1",
                        source, identifier
                    )));
                }
                if group.days_to_fetch == 0 {
                    return Err(Error::InvalidConfig(format!(
                        "{}.{} days_to_fetch must be at least 1",
                        source, identifier
                    )));
                }
            }
        }

        for identifier in self.sensors.next_to_watch.keys() {
            if TraktKind::from_identifier(identifier, "next_to_watch").is_none() {
                let known: Vec<&str> = NEXT_TO_WATCH_KINDS.iter().map(|k| k.identifier()).collect();
                return Err(Error::InvalidConfig(format!(
                    "unknown next_to_watch group '{}' (expected one of {:?})",
                    identifier, known
                )));
            }
        }

        Ok(())
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |s: &Option<String>| s.as_ref().map(|_| "********".to_string());
        let mut copy = self.clone();
        copy.trakt.access_token = mask(&self.trakt.access_token);
        copy.tmdb.api_key = mask(&self.tmdb.api_key);
        copy
    }

    /// Apply `TRAKT_CLIENT_ID`, `TRAKT_ACCESS_TOKEN` and `TMDB_API_KEY` overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(client_id) = std::env::var("TRAKT_CLIENT_ID") {
            self.trakt.client_id = Some(client_id);
        }
        if let Ok(token) = std::env::var("TRAKT_ACCESS_TOKEN") {
            self.trakt.access_token = Some(token);
        }
        if let Ok(api_key) = std::env::var("TMDB_API_KEY") {
            self.tmdb.api_key = Some(api_key);
        }
        self
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trakt_tv")
}

/// Default location of the settings file.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from file, falling back to defaults when it is absent.
pub fn load_config(path: Option<&Path>) -> Result<Configuration> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        Configuration::from_toml(&content)?
    } else {
        tracing::debug!("No config at {:?}, using defaults", config_path);
        Configuration::default()
    };

    Ok(config.with_env_overrides())
}
