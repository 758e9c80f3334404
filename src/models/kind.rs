//! Kinds of media a sensor can track.

use serde::{Deserialize, Serialize};

/// Which model variant a kind's records map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaVariant {
    Movie,
    Show,
}

impl MediaVariant {
    /// Map a Trakt item `type` to the model that can represent it.
    ///
    /// Episodes are represented by their show.
    pub fn from_trakt_type(trakt_type: &str) -> Option<Self> {
        match trakt_type {
            "movie" => Some(MediaVariant::Movie),
            "show" | "episode" => Some(MediaVariant::Show),
            _ => None,
        }
    }

    /// Key under which Trakt nests the record (`movie` / `show`).
    pub fn key(&self) -> &'static str {
        match self {
            MediaVariant::Movie => "movie",
            MediaVariant::Show => "show",
        }
    }

    /// Plural path segment used by sync endpoints.
    pub fn plural(&self) -> &'static str {
        match self {
            MediaVariant::Movie => "movies",
            MediaVariant::Show => "shows",
        }
    }
}

/// Every kind known to the integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraktKind {
    Show,
    NewShow,
    Premiere,
    Movie,
    Dvd,
    NextToWatchAll,
    NextToWatchAired,
    NextToWatchUpcoming,
    List,
}

/// Kinds backed by the calendar endpoints.
pub const UPCOMING_KINDS: [TraktKind; 5] = [
    TraktKind::Show,
    TraktKind::NewShow,
    TraktKind::Premiere,
    TraktKind::Movie,
    TraktKind::Dvd,
];

/// Kinds available for recommendations and anticipated titles.
pub const BASIC_KINDS: [TraktKind; 2] = [TraktKind::Show, TraktKind::Movie];

/// Kinds backed by watched progress.
pub const NEXT_TO_WATCH_KINDS: [TraktKind; 3] = [
    TraktKind::NextToWatchAll,
    TraktKind::NextToWatchAired,
    TraktKind::NextToWatchUpcoming,
];

impl TraktKind {
    /// Configuration key of this kind.
    pub fn identifier(&self) -> &'static str {
        match self {
            TraktKind::Show => "show",
            TraktKind::NewShow => "new_show",
            TraktKind::Premiere => "premiere",
            TraktKind::Movie => "movie",
            TraktKind::Dvd => "dvd",
            TraktKind::NextToWatchAll => "all",
            TraktKind::NextToWatchAired => "only_aired",
            TraktKind::NextToWatchUpcoming => "only_upcoming",
            TraktKind::List => "lists",
        }
    }

    /// Human readable name used in sensor names.
    pub fn name(&self) -> &'static str {
        match self {
            TraktKind::Show => "Shows",
            TraktKind::NewShow => "New Shows",
            TraktKind::Premiere => "Premieres",
            TraktKind::Movie => "Movies",
            TraktKind::Dvd => "DVD",
            TraktKind::NextToWatchAll => "All",
            TraktKind::NextToWatchAired => "Only Aired",
            TraktKind::NextToWatchUpcoming => "Only Upcoming",
            TraktKind::List => "Lists",
        }
    }

    /// Upstream path fragment (or path template for lists).
    pub fn path(&self) -> &'static str {
        match self {
            TraktKind::Show => "shows",
            TraktKind::NewShow => "shows/new",
            TraktKind::Premiere => "shows/premieres",
            TraktKind::Movie => "movies",
            TraktKind::Dvd => "dvd",
            TraktKind::NextToWatchAll
            | TraktKind::NextToWatchAired
            | TraktKind::NextToWatchUpcoming => "shows",
            TraktKind::List => "lists/{list_id}/items",
        }
    }

    /// Model variant for records of this kind. Lists decide per item.
    pub fn model(&self) -> Option<MediaVariant> {
        match self {
            TraktKind::Movie | TraktKind::Dvd => Some(MediaVariant::Movie),
            TraktKind::List => None,
            _ => Some(MediaVariant::Show),
        }
    }

    /// Resolve a configuration key for the given source.
    ///
    /// Next-to-watch groups accept both `only_aired` and `next_to_watch_only_aired`.
    pub fn from_identifier(identifier: &str, source: &str) -> Option<Self> {
        if source == "next_to_watch" {
            let bare = identifier.strip_prefix("next_to_watch_").unwrap_or(identifier);
            return NEXT_TO_WATCH_KINDS
                .into_iter()
                .find(|kind| kind.identifier() == bare);
        }

        UPCOMING_KINDS
            .into_iter()
            .find(|kind| kind.identifier() == identifier)
    }

    /// First path segment, used as the sensor unit.
    pub fn unit(&self) -> &'static str {
        self.path().split('/').next().unwrap_or_default()
    }
}

impl std::fmt::Display for TraktKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
