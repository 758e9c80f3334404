//! Sensor rendering.
//!
//! Turns a refresh [`Snapshot`] into the sensor states a dashboard reads:
//! one sensor per configured kind or list, plus one per exposed statistic.

use super::stats::stats_sensors;
use crate::core::refresh::{Snapshot, Source};
use crate::models::config::Configuration;
use crate::models::kind::{TraktKind, BASIC_KINDS, NEXT_TO_WATCH_KINDS, UPCOMING_KINDS};
use crate::models::media::{Medias, RenderOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const ICON_CALENDAR: &str = "mdi:calendar";
pub const ICON_MOVIE: &str = "mdi:movie";
pub const ICON_LIST: &str = "mdi:format-list-bulleted";

/// One rendered sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    pub name: String,
    pub state: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<SensorAttributes>,
}

/// Attribute payload of a media sensor: the template descriptor, then items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorAttributes {
    pub data: Vec<Value>,
}

/// Every sensor of one refresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorDocument {
    pub generated_at: Option<DateTime<Utc>>,
    pub sensors: Vec<SensorState>,
}

impl SensorDocument {
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SensorState> {
        self.sensors.iter().find(|s| s.name == name)
    }
}

/// Display prefix of a source.
pub fn sensor_prefix(source: Source) -> &'static str {
    match source {
        Source::Upcoming => "Trakt Upcoming",
        Source::AllUpcoming => "Trakt All Upcoming",
        Source::Recommendation => "Trakt Recommendation",
        Source::Anticipated => "Trakt Anticipated",
        Source::NextToWatch => "Trakt Next To Watch",
        Source::Lists => "Trakt List",
        Source::Stats => "Trakt Stats",
    }
}

fn sensor_icon(source: Source) -> &'static str {
    match source {
        Source::Recommendation | Source::Anticipated => ICON_MOVIE,
        Source::Lists => ICON_LIST,
        _ => ICON_CALENDAR,
    }
}

/// Render a media collection: template first, at most `max_medias` items.
///
/// An absent or empty collection renders no data at all.
pub fn media_data(medias: Option<&Medias>, max_medias: usize, order: RenderOrder) -> Vec<Value> {
    match medias {
        Some(medias) if !medias.is_empty() => {
            let mut data = medias.to_sensor_data(order);
            data.truncate(max_medias + 1);
            data
        }
        _ => Vec::new(),
    }
}

fn media_sensor(name: String, unit: &str, icon: &str, data: Vec<Value>) -> SensorState {
    SensorState {
        name,
        state: json!(data.len().saturating_sub(1)),
        unit: Some(unit.to_string()),
        icon: icon.to_string(),
        attributes: Some(SensorAttributes { data }),
    }
}

/// Sensor of one kind inside a kind-keyed source.
pub fn kind_sensor(
    snapshot: &Snapshot,
    source: Source,
    kind: TraktKind,
    max_medias: usize,
) -> SensorState {
    let data = media_data(
        snapshot.kind_medias(source, kind),
        max_medias,
        RenderOrder::ReleasedAsc,
    );
    media_sensor(
        format!("{} {}", sensor_prefix(source), kind.name()),
        kind.unit(),
        sensor_icon(source),
        data,
    )
}

fn kind_sensors(snapshot: &Snapshot, config: &Configuration) -> Vec<SensorState> {
    let mut sensors = Vec::new();

    for (source, all_medias) in [(Source::Upcoming, false), (Source::AllUpcoming, true)] {
        for kind in UPCOMING_KINDS {
            let identifier = kind.identifier();
            if config.upcoming_identifier_exists(identifier, all_medias) {
                let max_medias = config.upcoming_max_medias(identifier, all_medias);
                sensors.push(kind_sensor(snapshot, source, kind, max_medias));
            }
        }
    }

    for source in [Source::Recommendation, Source::Anticipated] {
        for kind in BASIC_KINDS {
            let identifier = kind.identifier();
            if config.identifier_exists(identifier, source.key()) {
                let max_medias = config.max_medias(identifier, source.key());
                sensors.push(kind_sensor(snapshot, source, kind, max_medias));
            }
        }
    }

    let source = Source::NextToWatch;
    for kind in NEXT_TO_WATCH_KINDS {
        let identifier = kind.identifier();
        if config.identifier_exists(identifier, source.key()) {
            let max_medias = config.max_medias(identifier, source.key());
            sensors.push(kind_sensor(snapshot, source, kind, max_medias));
        }
    }

    sensors
}

fn list_sensors(snapshot: &Snapshot, config: &Configuration) -> Vec<SensorState> {
    config
        .lists()
        .iter()
        .map(|list| {
            let medias = snapshot
                .lists
                .as_ref()
                .and_then(|lists| lists.get(&list.friendly_name));
            let data = media_data(medias, list.max_medias, RenderOrder::AsListed);
            media_sensor(
                format!("{} {}", sensor_prefix(Source::Lists), list.friendly_name),
                TraktKind::List.unit(),
                ICON_LIST,
                data,
            )
        })
        .collect()
}

/// Render every configured sensor from a snapshot.
pub fn render_snapshot(snapshot: &Snapshot, config: &Configuration) -> SensorDocument {
    let mut sensors = kind_sensors(snapshot, config);
    sensors.extend(list_sensors(snapshot, config));

    if config.source_exists(Source::Stats.key()) {
        if let Some(stats) = &snapshot.stats {
            sensors.extend(stats_sensors(stats, config));
        }
    }

    SensorDocument {
        generated_at: snapshot.fetched_at,
        sensors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::Media;

    fn movie(name: &str) -> Media {
        Media::from_trakt(
            &json!({"title": name, "ids": {"trakt": 1, "slug": name}}),
            crate::models::kind::MediaVariant::Movie,
        )
        .unwrap()
    }

    #[test]
    fn test_media_data_truncates_after_template() {
        let medias = Medias::new(vec![movie("a"), movie("b"), movie("c")]);
        let data = media_data(Some(&medias), 2, RenderOrder::AsListed);

        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["title_default"], "$title");
        assert_eq!(data[1]["title"], "a");
    }

    #[test]
    fn test_empty_medias_render_nothing() {
        assert!(media_data(None, 3, RenderOrder::ReleasedAsc).is_empty());
        assert!(media_data(Some(&Medias::default()), 3, RenderOrder::ReleasedAsc).is_empty());
    }

    #[test]
    fn test_media_sensor_state_counts_items() {
        let empty = media_sensor("x".into(), "shows", ICON_CALENDAR, Vec::new());
        assert_eq!(empty.state, json!(0));

        let medias = Medias::new(vec![movie("a"), movie("b")]);
        let data = media_data(Some(&medias), 5, RenderOrder::AsListed);
        let sensor = media_sensor("y".into(), "movies", ICON_MOVIE, data);
        assert_eq!(sensor.state, json!(2));
        assert_eq!(sensor.unit.as_deref(), Some("movies"));
    }
}
