//! Integration tests for calendar window splitting and the response cache.

use chrono::NaiveDate;
use std::time::Duration;
use trakt_tv::core::cache::{calendar_key, show_progress_key, ResponseCache};
use trakt_tv::core::calendar::{compute_calendar_windows, split, MAX_DAYS_PER_REQUEST};
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========== SPLIT TESTS ==========

#[test]
fn test_split_with_remainder() {
    assert_eq!(split(90, 33), vec![33, 33, 24]);
    assert_eq!(split(10, 3), vec![3, 3, 3, 1]);
}

#[test]
fn test_split_exact_and_small() {
    assert_eq!(split(3, 3), vec![3]);
    assert_eq!(split(66, 33), vec![33, 33]);
    assert_eq!(split(1, 33), vec![1]);
}

#[test]
fn test_split_sums_to_total() {
    for total in 1..200 {
        for by in 1..40 {
            let chunks = split(total, by);
            assert_eq!(chunks.iter().sum::<u32>(), total, "split({}, {})", total, by);
            assert!(chunks.iter().all(|c| *c >= 1 && *c <= by));
            assert_eq!(chunks.len() as u32, total.div_ceil(by));
        }
    }
}

// ========== WINDOW TESTS ==========

#[test]
fn test_windows_chain_end_to_end() {
    let windows = compute_calendar_windows(90, MAX_DAYS_PER_REQUEST, date(2022, 3, 12));

    assert_eq!(windows.len(), 3);
    assert_eq!(windows[0].from, date(2022, 3, 12));
    assert_eq!(windows[0].days, 33);
    assert_eq!(windows[1].from, date(2022, 4, 14));
    assert_eq!(windows[1].days, 33);
    assert_eq!(windows[2].from, date(2022, 5, 17));
    assert_eq!(windows[2].days, 24);
    assert_eq!(windows[2].start_date(), "2022-05-17");
}

#[test]
fn test_single_window_when_short() {
    let windows = compute_calendar_windows(30, MAX_DAYS_PER_REQUEST, date(2024, 12, 20));
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].start_date(), "2024-12-20");
    assert_eq!(windows[0].days, 30);
}

#[test]
fn test_no_window_for_zero_days() {
    assert!(compute_calendar_windows(0, MAX_DAYS_PER_REQUEST, date(2024, 1, 1)).is_empty());
}

// ========== CACHE TESTS ==========

#[test]
fn test_cache_hit_within_ttl() {
    let cache = ResponseCache::default();
    let key = calendar_key("my", "shows", "2024-01-01", 33);
    cache.insert(key.clone(), json!([{"title": "a"}]));

    assert_eq!(cache.retrieve(&key), Some(json!([{"title": "a"}])));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_expired_entry_is_evicted() {
    let cache = ResponseCache::new(Duration::from_millis(10));
    let key = show_progress_key(42);
    cache.insert(key.clone(), json!({"aired": 3}));

    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(cache.retrieve(&key), None);
    assert!(cache.is_empty());
}

#[test]
fn test_cache_keys_distinguish_scope() {
    assert_ne!(
        calendar_key("my", "shows", "2024-01-01", 33),
        calendar_key("all", "shows", "2024-01-01", 33)
    );
    assert_ne!(show_progress_key(1), show_progress_key(2));
}
