//! Integration tests for configuration loading and accessors.

use std::io::Write;
use tempfile::NamedTempFile;
use trakt_tv::models::config::{
    load_config, Configuration, ListMediaType, ListSortBy, SortOrder, DEFAULT_MAX_MEDIAS,
};
use trakt_tv::models::kind::TraktKind;

const SAMPLE: &str = r#"
language = "fr"
update_interval = 15

[trakt]
client_id = "abc"
access_token = "secret-token"

[tmdb]
api_key = "tmdb-key"

[sensors.upcoming.show]
days_to_fetch = 90
max_medias = 5

[sensors.upcoming.dvd]
enabled = false

[sensors.all_upcoming.movie]

[sensors.next_to_watch.next_to_watch_only_aired]
exclude = ["the-office", "1390"]

[sensors.recommendation.movie]
max_medias = 7

[sensors.anticipated.show]
exclude_collected = true

[sensors.stats.movies_watched]

[[sensors.lists]]
friendly_name = "Watchlist"
list_id = "watchlist"
private_list = true
media_type = "movie"
sort_by = "rating"
sort_order = "desc"
exclude_collected = true

[[sensors.lists]]
friendly_name = "Top"
list_id = "26885014"
max_medias = 10
"#;

fn sample() -> Configuration {
    Configuration::from_toml(SAMPLE).unwrap()
}

// ========== PARSING TESTS ==========

#[test]
fn test_defaults_when_empty() {
    let config = Configuration::from_toml("").unwrap();
    assert_eq!(config.language(), "en");
    assert_eq!(config.update_interval().as_secs(), 8 * 60);
    assert_eq!(config.refresh_timeout, 1800);
    assert!(!config.source_exists("upcoming"));
    assert!(!config.source_exists("lists"));
}

#[test]
fn test_parse_sample() {
    let config = sample();
    assert_eq!(config.language(), "fr");
    assert_eq!(config.update_interval().as_secs(), 15 * 60);
    assert_eq!(config.trakt.client_id.as_deref(), Some("abc"));
    assert_eq!(config.tmdb.api_key.as_deref(), Some("tmdb-key"));
}

#[test]
fn test_unknown_list_media_type_rejected() {
    let toml = r#"
[[sensors.lists]]
friendly_name = "Bad"
list_id = "1"
media_type = "person"
"#;
    assert!(Configuration::from_toml(toml).is_err());
}

// ========== ACCESSOR TESTS ==========

#[test]
fn test_group_accessors() {
    let config = sample();

    assert!(config.upcoming_identifier_exists("show", false));
    assert!(!config.upcoming_identifier_exists("dvd", false));
    assert!(!config.upcoming_identifier_exists("show", true));
    assert_eq!(config.upcoming_days_to_fetch("show", false), 90);
    assert_eq!(config.upcoming_max_medias("show", false), 5);
    assert_eq!(config.upcoming_max_medias("movie", true), DEFAULT_MAX_MEDIAS);
    assert_eq!(config.max_medias("movie", "recommendation"), 7);
    assert!(config.exclude_collected("show", "anticipated"));
    assert!(!config.exclude_collected("movie", "anticipated"));
}

#[test]
fn test_kinds_skip_disabled_groups() {
    let config = sample();
    assert_eq!(config.kinds("upcoming"), vec![TraktKind::Show]);
    assert_eq!(config.kinds("all_upcoming"), vec![TraktKind::Movie]);
}

#[test]
fn test_next_to_watch_prefixed_keys() {
    let config = sample();
    assert!(config.source_exists("next_to_watch"));
    assert_eq!(config.kinds("next_to_watch"), vec![TraktKind::NextToWatchAired]);
    assert!(config.identifier_exists("only_aired", "next_to_watch"));
    assert_eq!(
        config.exclude_items("only_aired", "next_to_watch"),
        vec!["the-office".to_string(), "1390".to_string()]
    );
}

#[test]
fn test_lists_and_stats() {
    let config = sample();
    assert!(config.source_exists("lists"));
    assert!(config.source_exists("stats"));
    assert!(config.stats_key_exists("movies_watched"));
    assert!(!config.stats_key_exists("all"));

    let lists = config.lists();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0].media_type, ListMediaType::Movie);
    assert_eq!(lists[0].sort_by, ListSortBy::Rating);
    assert_eq!(lists[0].sort_order, SortOrder::Desc);
    assert_eq!(lists[0].max_medias, DEFAULT_MAX_MEDIAS);
    assert_eq!(lists[1].sort_by, ListSortBy::Rank);
    assert!(!lists[1].private_list);
}

// ========== VALIDATION TESTS ==========

#[test]
fn test_validate_sample() {
    assert!(sample().validate().is_ok());
}

#[test]
fn test_validate_duplicate_list_names() {
    let toml = r#"
[[sensors.lists]]
friendly_name = "A"
list_id = "1"

[[sensors.lists]]
friendly_name = "A"
list_id = "2"
"#;
    let config = Configuration::from_toml(toml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_public_list_needs_numeric_id() {
    let toml = r#"
[[sensors.lists]]
friendly_name = "Slugged"
list_id = "my-list"
"#;
    let config = Configuration::from_toml(toml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_zero_max_medias() {
    let toml = r#"
[sensors.upcoming.show]
max_medias = 0
"#;
    let config = Configuration::from_toml(toml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_zero_refresh_timeout() {
    let config = Configuration::from_toml("refresh_timeout = 0\n").unwrap();
    assert!(matches!(
        config.validate(),
        Err(trakt_tv::Error::InvalidConfig(ref msg)) if msg.contains("refresh_timeout")
    ));

    let config = Configuration::from_toml("refresh_timeout = 1\n").unwrap();
    assert!(config.validate().is_ok());
}

// ========== FILE TESTS ==========

#[test]
fn test_load_config_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.kinds("upcoming"), vec![TraktKind::Show]);
}

#[test]
fn test_load_config_invalid_toml() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"language = [").unwrap();

    assert!(load_config(Some(file.path())).is_err());
}

#[test]
fn test_redacted_hides_secrets() {
    let redacted = sample().redacted();
    assert_eq!(redacted.trakt.access_token.as_deref(), Some("********"));
    assert_eq!(redacted.tmdb.api_key.as_deref(), Some("********"));
    assert_eq!(redacted.trakt.client_id.as_deref(), Some("abc"));
}
