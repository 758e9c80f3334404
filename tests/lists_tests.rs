//! Integration tests for custom list post-processing.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use trakt_tv::core::lists::{map_list_items, post_process, sort_medias, CollectedIds};
use trakt_tv::models::config::{ListConfig, ListMediaType, ListSortBy, SortOrder};
use trakt_tv::models::kind::MediaVariant;
use trakt_tv::models::media::Media;

fn list(max_medias: usize) -> ListConfig {
    ListConfig {
        friendly_name: "Test".to_string(),
        list_id: "watchlist".to_string(),
        private_list: true,
        media_type: ListMediaType::Any,
        max_medias,
        sort_by: ListSortBy::Rank,
        sort_order: SortOrder::Asc,
        exclude_collected: false,
        only_released: false,
    }
}

fn movie(trakt: u64, title: &str, released: Option<&str>, rating: Option<f64>) -> Media {
    let mut record = json!({"title": title, "ids": {"trakt": trakt}});
    if let Some(released) = released {
        record["released"] = json!(released);
    }
    if let Some(rating) = rating {
        record["rating"] = json!(rating);
    }
    Media::from_trakt(&record, MediaVariant::Movie).unwrap()
}

fn names(medias: &[Media]) -> Vec<&str> {
    medias.iter().map(|m| m.name.as_str()).collect()
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

// ========== MAPPING TESTS ==========

#[test]
fn test_map_list_items_skips_unsupported() {
    let raw = json!([
        {"rank": 1, "type": "movie", "movie": {"title": "Heat", "ids": {"trakt": 1}}},
        {"rank": 2, "type": "person", "person": {"name": "Al Pacino"}},
        {"rank": 3, "type": "episode", "episode": {"season": 1, "number": 2}, "show": {"title": "Lost", "ids": {"trakt": 2}}},
        {"rank": 4, "type": "show", "show": {"ids": {"trakt": 3}}},
        {"rank": 5, "type": "show", "show": {"title": "Dark", "ids": {"trakt": 4}}}
    ]);

    let medias = map_list_items(&raw, "Mixed");
    assert_eq!(names(&medias), vec!["Heat", "Lost", "Dark"]);
    assert_eq!(medias[1].variant(), MediaVariant::Show);
}

#[test]
fn test_map_list_items_empty() {
    assert!(map_list_items(&Value::Null, "Empty").is_empty());
    assert!(map_list_items(&json!([]), "Empty").is_empty());
}

// ========== PIPELINE TESTS ==========

#[test]
fn test_truncate_applies_after_filters() {
    let medias = vec![
        movie(1, "Seen", Some("2020-01-01"), None),
        movie(2, "Future", Some("2030-01-01"), None),
        movie(3, "A", Some("2021-01-01"), None),
        movie(4, "B", Some("2022-01-01"), None),
        movie(5, "C", Some("2023-01-01"), None),
    ];
    let mut config = list(2);
    config.exclude_collected = true;
    config.only_released = true;

    let mut collected = CollectedIds::default();
    collected.movies.insert(1);

    let result = post_process(medias, &config, Some(&collected), now());
    assert_eq!(names(&result), vec!["A", "B"]);
}

#[test]
fn test_only_released_drops_unknown_dates() {
    let medias = vec![
        movie(1, "Known", Some("2024-01-01"), None),
        movie(2, "Unknown", None, None),
    ];
    let mut config = list(10);
    config.only_released = true;

    let result = post_process(medias, &config, None, now());
    assert_eq!(names(&result), vec!["Known"]);
}

#[test]
fn test_collected_filter_ignored_when_disabled() {
    let medias = vec![movie(1, "Seen", None, None), movie(2, "New", None, None)];
    let mut collected = CollectedIds::default();
    collected.movies.insert(1);

    let result = post_process(medias, &list(10), Some(&collected), now());
    assert_eq!(names(&result), vec!["Seen", "New"]);
}

#[test]
fn test_collected_ids_are_per_media_type() {
    let show = Media::from_trakt(&json!({"title": "Same Id Show", "ids": {"trakt": 1}}), MediaVariant::Show).unwrap();
    let medias = vec![movie(1, "Movie", None, None), show];
    let mut config = list(10);
    config.exclude_collected = true;

    let mut collected = CollectedIds::default();
    collected.movies.insert(1);

    let result = post_process(medias, &config, Some(&collected), now());
    assert_eq!(names(&result), vec!["Same Id Show"]);
}

// ========== SORT TESTS ==========

#[test]
fn test_rank_desc_reverses() {
    let mut medias = vec![movie(1, "1", None, None), movie(2, "2", None, None), movie(3, "3", None, None)];
    sort_medias(&mut medias, ListSortBy::Rank, SortOrder::Desc);
    assert_eq!(names(&medias), vec!["3", "2", "1"]);
}

#[test]
fn test_rating_sort_missing_rating_counts_as_zero() {
    let build = || {
        vec![
            movie(1, "Mid", None, Some(6.5)),
            movie(2, "None", None, None),
            movie(3, "Top", None, Some(9.0)),
        ]
    };

    let mut asc = build();
    sort_medias(&mut asc, ListSortBy::Rating, SortOrder::Asc);
    assert_eq!(names(&asc), vec!["None", "Mid", "Top"]);

    let mut desc = build();
    sort_medias(&mut desc, ListSortBy::Rating, SortOrder::Desc);
    assert_eq!(names(&desc), vec!["Top", "Mid", "None"]);
}

#[test]
fn test_rating_sort_is_stable() {
    let mut medias = vec![
        movie(1, "First", None, Some(7.0)),
        movie(2, "Second", None, Some(7.0)),
        movie(3, "Third", None, Some(7.0)),
    ];
    sort_medias(&mut medias, ListSortBy::Rating, SortOrder::Desc);
    assert_eq!(names(&medias), vec!["First", "Second", "Third"]);
}
