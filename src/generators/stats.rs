//! Profile statistic sensors.

use super::sensor::{sensor_prefix, SensorState};
use crate::core::refresh::Source;
use crate::core::stats::Stats;
use crate::models::config::Configuration;

pub const ICON_STATS: &str = "mdi:chart-line";

/// Units recognised in a stat title, checked in this order.
const STAT_UNITS: [&str; 10] = [
    "ratings",
    "minutes",
    "comments",
    "friends",
    "followers",
    "following",
    "episodes",
    "movies",
    "shows",
    "seasons",
];

/// `movies_watched` becomes `Movies Watched`.
pub fn stat_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Unit of a stat, inferred from its title.
pub fn stat_unit(title: &str) -> Option<&'static str> {
    let title = title.to_lowercase();
    STAT_UNITS.into_iter().find(|unit| title.contains(unit))
}

/// One sensor per scalar stat that is exposed by the configuration.
///
/// `all` exposes every stat; otherwise only the configured keys are kept.
/// Nested values such as the rating distribution never become sensors.
pub fn stats_sensors(stats: &Stats, config: &Configuration) -> Vec<SensorState> {
    let allow_all = config.stats_key_exists("all");

    stats
        .iter()
        .filter(|(_, value)| !value.is_object() && !value.is_array())
        .filter(|(key, _)| allow_all || config.stats_key_exists(key))
        .map(|(key, value)| {
            let title = stat_title(key);
            SensorState {
                name: format!("{} {}", sensor_prefix(Source::Stats), title),
                state: value.clone(),
                unit: stat_unit(&title).map(str::to_string),
                icon: ICON_STATS.to_string(),
                attributes: None,
            }
        })
        .collect()
}
