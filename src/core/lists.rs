//! Custom list post-processing.
//!
//! Stages run in a fixed order: map supported items, drop collected/watched
//! items, drop unreleased items, sort, then truncate. Truncation comes last so
//! the configured limit applies to what survives the filters.

use crate::models::config::{ListConfig, ListMediaType, ListSortBy, SortOrder};
use crate::models::kind::MediaVariant;
use crate::models::media::Media;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// Trakt IDs the user has watched or collected, per media type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedIds {
    pub movies: HashSet<u64>,
    pub shows: HashSet<u64>,
}

impl CollectedIds {
    /// Add the IDs found in a `sync/watched` or `sync/collection` response.
    pub fn extend_from_sync(&mut self, variant: MediaVariant, items: &Value) {
        let ids = items
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|item| item.get(variant.key())?.get("ids")?.get("trakt")?.as_u64());
        match variant {
            MediaVariant::Movie => self.movies.extend(ids),
            MediaVariant::Show => self.shows.extend(ids),
        }
    }

    pub fn contains(&self, media: &Media) -> bool {
        let Some(id) = media.ids.trakt else {
            return false;
        };
        match media.variant() {
            MediaVariant::Movie => self.movies.contains(&id),
            MediaVariant::Show => self.shows.contains(&id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty()
    }
}

/// Media types whose watched/collected sets a list filter needs.
pub fn collected_types(media_type: ListMediaType) -> Vec<MediaVariant> {
    match media_type {
        ListMediaType::Any => vec![MediaVariant::Movie, MediaVariant::Show],
        ListMediaType::Movie => vec![MediaVariant::Movie],
        ListMediaType::Show | ListMediaType::Episode => vec![MediaVariant::Show],
    }
}

/// Map raw list items to media, skipping unsupported types and broken records.
pub fn map_list_items(raw_items: &Value, friendly_name: &str) -> Vec<Media> {
    let mut medias = Vec::new();

    for item in raw_items.as_array().into_iter().flatten() {
        let item_type = item.get("type").and_then(Value::as_str).unwrap_or_default();
        let Some(variant) = MediaVariant::from_trakt_type(item_type) else {
            tracing::warn!(
                "Media type {} in {} is not supported",
                item_type,
                friendly_name
            );
            continue;
        };

        match Media::from_trakt(item, variant) {
            Ok(media) => medias.push(media),
            Err(e) => tracing::warn!("Skipping item in {}: {}", friendly_name, e),
        }
    }

    medias
}

/// Rating used for sorting: TMDB when known, Trakt otherwise, zero if neither.
fn sort_rating(media: &Media) -> f64 {
    media.rating.or(media.rating_trakt).unwrap_or(0.0)
}

/// Sort in place. Equal keys keep their relative order.
pub fn sort_medias(medias: &mut [Media], sort_by: ListSortBy, order: SortOrder) {
    match (sort_by, order) {
        (ListSortBy::Rating, SortOrder::Asc) => {
            medias.sort_by(|a, b| sort_rating(a).total_cmp(&sort_rating(b)))
        }
        (ListSortBy::Rating, SortOrder::Desc) => {
            medias.sort_by(|a, b| sort_rating(b).total_cmp(&sort_rating(a)))
        }
        (ListSortBy::Rank, SortOrder::Asc) => {}
        (ListSortBy::Rank, SortOrder::Desc) => medias.reverse(),
    }
}

/// Apply the filter, sort and truncate stages of one list.
///
/// `collected` is only consulted when the list asks to exclude collected items.
pub fn post_process(
    medias: Vec<Media>,
    list: &ListConfig,
    collected: Option<&CollectedIds>,
    now: DateTime<Utc>,
) -> Vec<Media> {
    let mut medias = medias;

    if list.exclude_collected {
        if let Some(collected) = collected.filter(|c| !c.is_empty()) {
            medias.retain(|media| !collected.contains(media));
        }
    }

    if list.only_released {
        medias.retain(|media| media.is_released(now));
    }

    sort_medias(&mut medias, list.sort_by, list.sort_order);
    medias.truncate(list.max_medias);
    medias
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collected_ids_from_sync() {
        let mut collected = CollectedIds::default();
        collected.extend_from_sync(
            MediaVariant::Movie,
            &json!([
                {"movie": {"ids": {"trakt": 1}}},
                {"movie": {"ids": {"trakt": 2}}},
                {"movie": {"ids": {}}}
            ]),
        );
        collected.extend_from_sync(MediaVariant::Show, &json!([{"show": {"ids": {"trakt": 1}}}]));

        assert_eq!(collected.movies.len(), 2);
        assert!(collected.shows.contains(&1));
    }

    #[test]
    fn test_collected_types() {
        assert_eq!(collected_types(ListMediaType::Any).len(), 2);
        assert_eq!(
            collected_types(ListMediaType::Episode),
            vec![MediaVariant::Show]
        );
    }
}
