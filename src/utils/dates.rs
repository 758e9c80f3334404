//! Date helpers.

use chrono::{DateTime, NaiveDate, Utc};

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
const YEAR_ONE_TIMESTAMP: i64 = -62_135_596_800;

/// Placeholder release timestamp for media with no known release date.
pub fn sentinel_min() -> DateTime<Utc> {
    DateTime::from_timestamp(YEAR_ONE_TIMESTAMP, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse an ISO-8601 timestamp or a plain `YYYY-MM-DD` date as UTC.
///
/// Plain dates resolve to midnight UTC. Empty or invalid input yields `None`.
pub fn parse_utc_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format a timestamp the way the sensor attributes expect (`...T..:..:..Z`).
pub fn format_airdate(value: &DateTime<Utc>) -> String {
    format!("{}Z", value.naive_utc().format("%Y-%m-%dT%H:%M:%S"))
}
