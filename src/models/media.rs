//! Media data models.
//!
//! A [`Media`] is built from one raw Trakt record, then replaced once by the
//! TMDB-enriched copy (see [`crate::core::enrich`]). After that it is only read.

use super::ids::Identifiers;
use super::kind::MediaVariant;
use crate::utils::dates::{format_airdate, parse_utc_date, sentinel_min};
use crate::utils::json::{extract_value_from, non_empty_str};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Template descriptor placed before the media records in sensor attributes.
pub fn display_template() -> Value {
    json!({
        "title_default": "$title",
        "line1_default": "$episode",
        "line2_default": "$release",
        "line3_default": "$rating - $runtime",
        "line4_default": "$number - $studio",
        "icon": "mdi:arrow-down-bold",
    })
}

/// An episode attached to a show (usually the next one to watch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub number: u32,
    pub season: u32,
    pub title: Option<String>,
    pub ids: Identifiers,
}

impl Episode {
    /// Create an Episode from a Trakt episode object.
    pub fn from_trakt(data: &Value) -> Result<Self> {
        let number = extract_value_from(data, &["number"])?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| Error::MissingField("[\"number\"]".to_string()))?;
        let season = extract_value_from(data, &["season"])?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| Error::MissingField("[\"season\"]".to_string()))?;

        Ok(Self {
            number,
            season,
            title: non_empty_str(data.get("title")),
            ids: Identifiers::from_trakt(data),
        })
    }

    /// Two-digit season label (`03`, `12`).
    pub fn season_label(&self) -> String {
        format!("{:02}", self.season)
    }

    /// Two-digit episode label.
    pub fn number_label(&self) -> String {
        format!("{:02}", self.number)
    }

    /// `S01E05` style label.
    pub fn code(&self) -> String {
        format!("S{}E{}", self.season_label(), self.number_label())
    }
}

/// Variant-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show {
        episode: Option<Episode>,
        last_activity: Option<DateTime<Utc>>,
    },
}

/// A movie or a show as displayed by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Display name.
    pub name: String,
    /// Identifiers of the movie or show.
    pub ids: Identifiers,
    /// Release (or first air) timestamp.
    pub released: Option<DateTime<Utc>>,
    /// Poster URL.
    pub poster: Option<String>,
    /// Fanart/backdrop URL.
    pub fanart: Option<String>,
    /// Genre names.
    pub genres: Vec<String>,
    /// TMDB vote average.
    pub rating: Option<f64>,
    /// Trakt rating.
    pub rating_trakt: Option<f64>,
    /// Runtime in minutes.
    pub runtime: Option<u32>,
    /// Studio or network.
    pub studio: Option<String>,
    /// Trailer URL.
    pub trailer: Option<String>,
    /// Overview.
    pub summary: Option<String>,
    /// Rank inside a Trakt list.
    pub rank: Option<u32>,
    /// When the item was added to a list.
    pub listed_at: Option<DateTime<Utc>>,
    pub kind: MediaKind,
}

impl Media {
    fn base(name: String, ids: Identifiers, kind: MediaKind) -> Self {
        Self {
            name,
            ids,
            released: None,
            poster: None,
            fanart: None,
            genres: Vec::new(),
            rating: None,
            rating_trakt: None,
            runtime: None,
            studio: None,
            trailer: None,
            summary: None,
            rank: None,
            listed_at: None,
            kind,
        }
    }

    /// Create a media of the given variant from a raw Trakt record.
    ///
    /// The record is either the movie/show object itself (it has a `title`) or
    /// a wrapper holding it under `movie`/`show` next to list or calendar fields.
    pub fn from_trakt(data: &Value, variant: MediaVariant) -> Result<Self> {
        let inner = if data.get("title").is_some_and(|t| !t.is_null()) {
            data
        } else {
            extract_value_from(data, &[variant.key()])?
        };

        let name = extract_value_from(inner, &["title"])?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::MissingField("[\"title\"]".to_string()))?;
        let ids = Identifiers::from_trakt(inner);

        let mut media = match variant {
            MediaVariant::Movie => {
                let mut media = Self::base(name, ids, MediaKind::Movie);
                media.released = parse_utc_date(date_field(data, inner, "released"));
                media
            }
            MediaVariant::Show => {
                let episode = match data.get("episode") {
                    Some(episode) if !episode.is_null() => Some(Episode::from_trakt(episode)?),
                    _ => None,
                };
                let last_activity =
                    parse_utc_date(data.get("last_watched_at").and_then(Value::as_str));
                let mut media = Self::base(
                    name,
                    ids,
                    MediaKind::Show {
                        episode,
                        last_activity,
                    },
                );
                media.released = parse_utc_date(date_field(data, inner, "first_aired"));
                media.runtime = as_u32(inner.get("runtime"));
                media
            }
        };

        media.rank = as_u32(data.get("rank"));
        media.listed_at = parse_utc_date(data.get("listed_at").and_then(Value::as_str));
        media.rating_trakt = inner.get("rating").and_then(Value::as_f64);

        Ok(media)
    }

    /// Which model variant this media is.
    pub fn variant(&self) -> MediaVariant {
        match self.kind {
            MediaKind::Movie => MediaVariant::Movie,
            MediaKind::Show { .. } => MediaVariant::Show,
        }
    }

    /// The next episode, for shows that carry one.
    pub fn episode(&self) -> Option<&Episode> {
        match &self.kind {
            MediaKind::Show { episode, .. } => episode.as_ref(),
            MediaKind::Movie => None,
        }
    }

    /// Release timestamp, with the sentinel standing in for unknown dates.
    pub fn released_or_min(&self) -> DateTime<Utc> {
        self.released.unwrap_or_else(sentinel_min)
    }

    /// Whether the media has a known release at or before `now`.
    pub fn is_released(&self, now: DateTime<Utc>) -> bool {
        self.released.is_some_and(|released| released <= now)
    }

    /// Link to the item on trakt.tv.
    pub fn deep_link(&self) -> Option<String> {
        let slug = self.ids.slug.as_deref()?;
        Some(match &self.kind {
            MediaKind::Movie => format!("https://trakt.tv/movies/{}", slug),
            MediaKind::Show {
                episode: Some(episode),
                ..
            } => format!(
                "https://trakt.tv/shows/{}/seasons/{}/episodes/{}",
                slug,
                episode.season_label(),
                episode.number_label()
            ),
            MediaKind::Show { episode: None, .. } => format!("https://trakt.tv/shows/{}", slug),
        })
    }

    /// Render one sensor attribute record.
    pub fn to_sensor_record(&self) -> Value {
        let mut record = Map::new();

        record.insert("title".into(), json!(self.name));
        insert_some(&mut record, "poster", &self.poster);
        insert_some(&mut record, "fanart", &self.fanart);
        record.insert("genres".into(), json!(self.genres));
        insert_some(&mut record, "rating", &self.rating);
        insert_some(&mut record, "rating_trakt", &self.rating_trakt);
        insert_some(&mut record, "studio", &self.studio);

        if let MediaKind::Movie = self.kind {
            record.insert("runtime".into(), json!(self.runtime));
        }

        record.insert("release".into(), json!("$day, $date $time"));
        record.insert("airdate".into(), json!(format_airdate(&self.released_or_min())));
        record.insert("ids".into(), json!(self.ids));

        if let Some(episode) = self.episode() {
            record.insert("episode".into(), json!(episode.title));
            record.insert("number".into(), json!(episode.code()));
        }

        insert_some(&mut record, "deep_link", &self.deep_link());
        insert_some(&mut record, "trailer", &self.trailer);
        insert_some(&mut record, "summary", &self.summary);

        Value::Object(record)
    }
}

/// Read a date from the wrapper record, falling back to the movie/show object.
fn date_field<'a>(data: &'a Value, inner: &'a Value, key: &str) -> Option<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .or_else(|| inner.get(key).and_then(Value::as_str))
}

/// A non-negative integer that fits in `u32`; anything else is treated as absent.
fn as_u32(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}

fn insert_some<T: Serialize>(record: &mut Map<String, Value>, key: &str, value: &Option<T>) {
    if let Some(value) = value {
        record.insert(key.to_string(), json!(value));
    }
}

/// Ordering applied when rendering a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderOrder {
    /// Oldest release first.
    #[default]
    ReleasedAsc,
    /// Keep the collection order (already sorted by list settings).
    AsListed,
}

/// An ordered collection of media, rebuilt on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Medias {
    pub items: Vec<Media>,
}

impl Medias {
    pub fn new(items: Vec<Media>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in render order. Sorting is stable for equal release dates.
    pub fn sorted(&self, order: RenderOrder) -> Vec<&Media> {
        let mut items: Vec<&Media> = self.items.iter().collect();
        match order {
            RenderOrder::ReleasedAsc => items.sort_by_key(|m| m.released_or_min()),
            RenderOrder::AsListed => {}
        }
        items
    }

    /// Template descriptor followed by one record per item.
    pub fn to_sensor_data(&self, order: RenderOrder) -> Vec<Value> {
        std::iter::once(display_template())
            .chain(self.sorted(order).into_iter().map(Media::to_sensor_record))
            .collect()
    }
}
