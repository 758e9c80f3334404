//! Next-to-watch show selection.

use crate::models::ids::Identifiers;
use crate::models::kind::TraktKind;
use crate::models::media::Media;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// Hidden-item sections that remove a show from progress tracking.
pub const HIDDEN_SECTIONS: [&str; 4] = [
    "calendar",
    "progress_watched",
    "progress_watched_reset",
    "progress_collected",
];

/// Collect the Trakt IDs of hidden shows across all sections, deduplicated.
pub fn hidden_show_ids<'a>(sections: impl IntoIterator<Item = &'a Value>) -> HashSet<u64> {
    let mut hidden = HashSet::new();
    for items in sections {
        for item in items.as_array().into_iter().flatten() {
            match item
                .get("show")
                .and_then(|s| s.get("ids"))
                .and_then(|ids| ids.get("trakt"))
                .and_then(Value::as_u64)
            {
                Some(id) => {
                    hidden.insert(id);
                }
                None => tracing::warn!("Hidden item without a show trakt ID: {}", item),
            }
        }
    }
    hidden
}

/// Whether a watched-show record is excluded by the user or hidden on Trakt.
///
/// User exclusions match either the slug or the Trakt ID.
pub fn is_show_excluded(show: &Value, excluded: &[String], hidden: &HashSet<u64>) -> bool {
    let Some(inner) = show.get("show") else {
        return false;
    };
    let ids = Identifiers::from_trakt(inner);

    ids.trakt.is_some_and(|id| hidden.contains(&id))
        || excluded.iter().any(|e| ids.matches(e.trim()))
}

/// A show is finished when every aired episode has been watched.
pub fn is_show_finished(progress: &Value) -> bool {
    match (
        progress.get("aired").and_then(Value::as_u64),
        progress.get("completed").and_then(Value::as_u64),
    ) {
        (Some(aired), Some(completed)) => aired == completed,
        _ => false,
    }
}

/// Attach the next episode to a watched-show record, taking its air date.
pub fn attach_next_episode(mut show: Value, episode: Value) -> Value {
    if let Some(record) = show.as_object_mut() {
        if let Some(first_aired) = episode.get("first_aired").filter(|v| !v.is_null()) {
            record.insert("first_aired".to_string(), first_aired.clone());
        }
        record.insert("episode".to_string(), episode);
    }
    show
}

/// Finished shows are dropped for every mode except "only upcoming".
pub fn excludes_finished(kind: TraktKind) -> bool {
    kind != TraktKind::NextToWatchUpcoming
}

/// Keep aired or upcoming episodes depending on the next-to-watch mode.
pub fn filter_by_airing(medias: Vec<Media>, kind: TraktKind, now: DateTime<Utc>) -> Vec<Media> {
    match kind {
        TraktKind::NextToWatchAired => medias
            .into_iter()
            .filter(|m| m.released_or_min() <= now)
            .collect(),
        TraktKind::NextToWatchUpcoming => medias
            .into_iter()
            .filter(|m| m.released_or_min() > now)
            .collect(),
        _ => medias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hidden_show_ids_deduplicates() {
        let calendar = json!([{"show": {"ids": {"trakt": 1}}}, {"show": {"ids": {"trakt": 2}}}]);
        let progress = json!([{"show": {"ids": {"trakt": 2}}}, {"movie": {"ids": {"trakt": 3}}}]);
        let hidden = hidden_show_ids([&calendar, &progress, &Value::Null]);
        assert_eq!(hidden, HashSet::from([1, 2]));
    }

    #[test]
    fn test_is_show_finished() {
        assert!(is_show_finished(&json!({"aired": 10, "completed": 10})));
        assert!(!is_show_finished(&json!({"aired": 10, "completed": 9})));
        assert!(!is_show_finished(&json!({"aired": 10})));
    }

    #[test]
    fn test_attach_next_episode() {
        let show = json!({"show": {"title": "Dark"}});
        let episode = json!({"season": 2, "number": 3, "first_aired": "2019-06-21T07:00:00.000Z"});
        let attached = attach_next_episode(show, episode);
        assert_eq!(attached["first_aired"], "2019-06-21T07:00:00.000Z");
        assert_eq!(attached["episode"]["number"], 3);
    }

    #[test]
    fn test_excludes_finished() {
        assert!(excludes_finished(TraktKind::NextToWatchAll));
        assert!(excludes_finished(TraktKind::NextToWatchAired));
        assert!(!excludes_finished(TraktKind::NextToWatchUpcoming));
    }
}
