//! Refresh orchestration.
//!
//! [`TraktApi::retrieve_data`] runs one refresh cycle: every active source is
//! fetched concurrently, each category's items are enriched concurrently, and
//! the results are assembled into a [`Snapshot`]. The whole cycle is bounded
//! by the configured timeout; a timed-out cycle yields no snapshot at all.

use super::calendar::{calendar_anchor, compute_calendar_windows, MAX_DAYS_PER_REQUEST};
use super::enrich::enrich_all;
use super::lists::{collected_types, map_list_items, post_process, CollectedIds};
use super::stats::{flatten_stats, Stats};
use super::watched::{
    attach_next_episode, excludes_finished, filter_by_airing, hidden_show_ids, is_show_excluded,
    is_show_finished, HIDDEN_SECTIONS,
};
use crate::models::config::{Configuration, ListConfig};
use crate::models::kind::{MediaVariant, TraktKind, BASIC_KINDS, NEXT_TO_WATCH_KINDS, UPCOMING_KINDS};
use crate::models::media::{Media, Medias};
use crate::services::tmdb::{TmdbClient, TmdbConfig};
use crate::services::token::token_source_from_settings;
use crate::services::trakt::{CalendarScope, SyncSet, TraktClient};
use crate::utils::json::extract_value_from;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Concurrent per-show lookups while building next-to-watch results.
const SHOW_LOOKUP_CONCURRENCY: usize = 8;

/// A configured data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Upcoming,
    AllUpcoming,
    Recommendation,
    Anticipated,
    NextToWatch,
    Lists,
    Stats,
}

impl Source {
    pub const ALL: [Source; 7] = [
        Source::Upcoming,
        Source::AllUpcoming,
        Source::Recommendation,
        Source::Anticipated,
        Source::NextToWatch,
        Source::Lists,
        Source::Stats,
    ];

    /// Configuration key of the source.
    pub fn key(&self) -> &'static str {
        match self {
            Source::Upcoming => "upcoming",
            Source::AllUpcoming => "all_upcoming",
            Source::Recommendation => "recommendation",
            Source::Anticipated => "anticipated",
            Source::NextToWatch => "next_to_watch",
            Source::Lists => "lists",
            Source::Stats => "stats",
        }
    }
}

/// Media grouped by kind.
pub type KindMedias = BTreeMap<TraktKind, Medias>;

/// Result of one refresh cycle. Sources that are not configured stay `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub upcoming: Option<KindMedias>,
    pub all_upcoming: Option<KindMedias>,
    pub recommendation: Option<KindMedias>,
    pub anticipated: Option<KindMedias>,
    pub next_to_watch: Option<KindMedias>,
    /// Lists keyed by friendly name.
    pub lists: Option<BTreeMap<String, Medias>>,
    pub stats: Option<Stats>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Media of one kind inside a kind-keyed source.
    pub fn kind_medias(&self, source: Source, kind: TraktKind) -> Option<&Medias> {
        let by_kind = match source {
            Source::Upcoming => self.upcoming.as_ref(),
            Source::AllUpcoming => self.all_upcoming.as_ref(),
            Source::Recommendation => self.recommendation.as_ref(),
            Source::Anticipated => self.anticipated.as_ref(),
            Source::NextToWatch => self.next_to_watch.as_ref(),
            Source::Lists | Source::Stats => None,
        }?;
        by_kind.get(&kind)
    }

    /// Total number of media across every source.
    pub fn media_count(&self) -> usize {
        let kinds: usize = [
            &self.upcoming,
            &self.all_upcoming,
            &self.recommendation,
            &self.anticipated,
            &self.next_to_watch,
        ]
        .into_iter()
        .flatten()
        .flat_map(|by_kind| by_kind.values())
        .map(Medias::len)
        .sum();
        let lists: usize = self
            .lists
            .iter()
            .flat_map(|lists| lists.values())
            .map(Medias::len)
            .sum();
        kinds + lists
    }
}

/// Map raw records to media, logging and skipping the ones that do not parse.
fn medias_from_raw<'a>(
    raw: impl IntoIterator<Item = &'a Value>,
    variant: MediaVariant,
    context: &str,
) -> Vec<Media> {
    raw.into_iter()
        .filter_map(|item| match Media::from_trakt(item, variant) {
            Ok(media) => Some(media),
            Err(e) => {
                tracing::warn!("Skipping {} item: {}", context, e);
                None
            }
        })
        .collect()
}

fn as_items(value: &Value) -> impl Iterator<Item = &Value> {
    value.as_array().into_iter().flatten()
}

/// Orchestrates Trakt and TMDB calls for one configured account.
pub struct TraktApi {
    trakt: TraktClient,
    http: reqwest::Client,
}

impl TraktApi {
    /// Wrap an existing Trakt client.
    pub fn new(trakt: TraktClient) -> Self {
        Self {
            trakt,
            http: reqwest::Client::new(),
        }
    }

    /// Build the clients from the credentials in a configuration.
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let client_id = config
            .trakt
            .client_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or(Error::TraktClientIdMissing)?;
        let tokens = token_source_from_settings(&config.trakt)?;

        let http = reqwest::Client::new();
        let trakt = TraktClient::new(client_id, tokens).with_http_client(http.clone());
        Ok(Self { trakt, http })
    }

    /// The underlying Trakt client.
    pub fn trakt(&self) -> &TraktClient {
        &self.trakt
    }

    fn tmdb(&self, config: &Configuration) -> Option<TmdbClient> {
        let api_key = config.tmdb.api_key.as_deref()?.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(TmdbClient::with_client(
            self.http.clone(),
            TmdbConfig::new(api_key, config.language()),
        ))
    }

    /// Run one refresh cycle bounded by the configured timeout.
    pub async fn retrieve_data(&self, config: &Configuration) -> Result<Snapshot> {
        let timeout = Duration::from_secs(config.refresh_timeout);
        match tokio::time::timeout(timeout, self.fetch_all(config)).await {
            Ok(snapshot) => snapshot,
            Err(_) => Err(Error::RefreshTimeout(config.refresh_timeout)),
        }
    }

    async fn fetch_all(&self, config: &Configuration) -> Result<Snapshot> {
        let tmdb = self.tmdb(config);
        if tmdb.is_none() {
            tracing::debug!("No TMDB API key, skipping enrichment");
        }
        let tmdb = tmdb.as_ref();

        let active = |source: Source| config.source_exists(source.key());
        for source in Source::ALL.into_iter().filter(|s| active(*s)) {
            tracing::debug!("Source enabled: {}", source.key());
        }

        let (upcoming, all_upcoming, recommendation, anticipated, next_to_watch, lists, stats) = tokio::try_join!(
            async {
                if active(Source::Upcoming) {
                    self.fetch_upcomings(config, tmdb, false).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if active(Source::AllUpcoming) {
                    self.fetch_upcomings(config, tmdb, true).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if active(Source::Recommendation) {
                    self.fetch_recommendations(config, tmdb).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if active(Source::Anticipated) {
                    self.fetch_anticipated_medias(config, tmdb).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if active(Source::NextToWatch) {
                    self.fetch_next_to_watch_medias(config, tmdb).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if active(Source::Lists) {
                    self.fetch_lists(config, tmdb).await.map(Some)
                } else {
                    Ok(None)
                }
            },
            async {
                if active(Source::Stats) {
                    self.fetch_stats().await.map(Some)
                } else {
                    Ok(None)
                }
            },
        )?;

        let snapshot = Snapshot {
            upcoming,
            all_upcoming,
            recommendation,
            anticipated,
            next_to_watch,
            lists,
            stats,
            fetched_at: Some(Utc::now()),
        };
        tracing::info!(
            "Refresh complete: {} media, cache holds {} responses",
            snapshot.media_count(),
            self.trakt.cache().len()
        );
        Ok(snapshot)
    }

    // ========== UPCOMING ==========

    async fn fetch_upcomings(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
        all_medias: bool,
    ) -> Result<KindMedias> {
        let source = if all_medias { Source::AllUpcoming } else { Source::Upcoming };
        let kinds: Vec<TraktKind> = config
            .kinds(source.key())
            .into_iter()
            .filter(|kind| UPCOMING_KINDS.contains(kind))
            .collect();

        let data = try_join_all(
            kinds
                .iter()
                .map(|kind| self.fetch_upcoming(config, tmdb, *kind, all_medias)),
        )
        .await?;

        Ok(data.into_iter().flatten().collect())
    }

    async fn fetch_upcoming(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
        kind: TraktKind,
        all_medias: bool,
    ) -> Result<Option<(TraktKind, Medias)>> {
        let identifier = kind.identifier();
        let Some(variant) = kind.model() else {
            return Ok(None);
        };
        if !config.upcoming_identifier_exists(identifier, all_medias) {
            return Ok(None);
        }

        let max_medias = config.upcoming_max_medias(identifier, all_medias);
        let days_to_fetch = config.upcoming_days_to_fetch(identifier, all_medias);
        let scope = CalendarScope::from_all_medias(all_medias);
        let windows = compute_calendar_windows(days_to_fetch, MAX_DAYS_PER_REQUEST, calendar_anchor());

        let responses = try_join_all(
            windows
                .into_iter()
                .map(|window| self.trakt.fetch_calendar(kind.path(), window, scope)),
        )
        .await?;

        let raw: Vec<&Value> = responses.iter().flat_map(as_items).take(max_medias).collect();
        let now = Utc::now();
        let medias: Vec<Media> = medias_from_raw(raw, variant, identifier)
            .into_iter()
            .filter(|media| media.released.is_some_and(|released| released >= now))
            .collect();

        let medias = enrich_all(medias, tmdb).await;
        Ok(Some((kind, Medias::new(medias))))
    }

    // ========== NEXT TO WATCH ==========

    async fn fetch_next_to_watch_medias(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
    ) -> Result<KindMedias> {
        let kinds: Vec<TraktKind> = config
            .kinds(Source::NextToWatch.key())
            .into_iter()
            .filter(|kind| NEXT_TO_WATCH_KINDS.contains(kind))
            .collect();

        let data = try_join_all(
            kinds
                .iter()
                .map(|kind| self.fetch_next_to_watch(config, tmdb, *kind)),
        )
        .await?;

        Ok(data.into_iter().collect())
    }

    async fn fetch_next_to_watch(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
        kind: TraktKind,
    ) -> Result<(TraktKind, Medias)> {
        let identifier = kind.identifier();
        let excluded = config.exclude_items(identifier, Source::NextToWatch.key());

        let raw_shows = self.fetch_watched(&excluded, excludes_finished(kind)).await?;
        let medias = medias_from_raw(&raw_shows, MediaVariant::Show, identifier);
        let medias = filter_by_airing(medias, kind, Utc::now());

        let medias = enrich_all(medias, tmdb).await;
        Ok((kind, Medias::new(medias)))
    }

    /// Hidden shows across all hidden-item sections.
    async fn fetch_hidden_show_ids(&self) -> Result<HashSet<u64>> {
        let sections = try_join_all(
            HIDDEN_SECTIONS
                .iter()
                .map(|section| self.trakt.fetch_hidden_shows(section)),
        )
        .await?;
        Ok(hidden_show_ids(&sections))
    }

    /// Watched shows with their next episode attached.
    ///
    /// Excluded and hidden shows are dropped before any progress lookup;
    /// finished shows are dropped afterwards when requested.
    pub async fn fetch_watched(
        &self,
        excluded: &[String],
        exclude_finished: bool,
    ) -> Result<Vec<Value>> {
        let (hidden, raw_shows) = tokio::try_join!(
            self.fetch_hidden_show_ids(),
            self.trakt.fetch_watched_shows()
        )?;

        let candidates: Vec<Value> = as_items(&raw_shows)
            .filter(|show| !is_show_excluded(show, excluded, &hidden))
            .cloned()
            .collect();

        let shows: Vec<Option<Value>> = stream::iter(candidates)
            .map(|show| self.fetch_watched_show(show, exclude_finished))
            .buffered(SHOW_LOOKUP_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(shows.into_iter().flatten().collect())
    }

    /// Look up one show's progress and next episode.
    ///
    /// Per-show failures are logged and skip the show; only a missing access
    /// token aborts the refresh.
    async fn fetch_watched_show(&self, show: Value, exclude_finished: bool) -> Result<Option<Value>> {
        let slug = show
            .get("show")
            .and_then(|s| s.get("ids"))
            .and_then(|ids| ids.get("slug"))
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();

        match self.next_episode_for(show, exclude_finished).await {
            Ok(show) => Ok(show),
            Err(e @ Error::TraktTokenUnavailable(_)) => Err(e),
            Err(e) => {
                tracing::warn!("Show {} can't be extracted because: {}", slug, e);
                Ok(None)
            }
        }
    }

    async fn next_episode_for(&self, show: Value, exclude_finished: bool) -> Result<Option<Value>> {
        let trakt_id = extract_value_from(&show, &["show", "ids", "trakt"])?
            .as_u64()
            .ok_or_else(|| Error::MissingField("[\"show\", \"ids\", \"trakt\"]".to_string()))?;

        let progress = self.trakt.fetch_show_progress(trakt_id).await?;
        if exclude_finished && is_show_finished(&progress) {
            return Ok(None);
        }

        let season = extract_value_from(&progress, &["next_episode", "season"])?
            .as_u64()
            .ok_or_else(|| Error::MissingField("[\"next_episode\", \"season\"]".to_string()))?;
        let number = extract_value_from(&progress, &["next_episode", "number"])?
            .as_u64()
            .ok_or_else(|| Error::MissingField("[\"next_episode\", \"number\"]".to_string()))?;

        let episode = self.trakt.fetch_episode(trakt_id, season, number).await?;
        Ok(Some(attach_next_episode(show, episode)))
    }

    // ========== RECOMMENDATIONS / ANTICIPATED ==========

    async fn fetch_recommendations(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
    ) -> Result<KindMedias> {
        let source = Source::Recommendation.key();
        let kinds: Vec<TraktKind> = config
            .kinds(source)
            .into_iter()
            .filter(|kind| BASIC_KINDS.contains(kind))
            .collect();

        let data = try_join_all(kinds.iter().map(|kind| async move {
            let max_medias = config.max_medias(kind.identifier(), source);
            let raw = self.trakt.fetch_recommendations(kind.path(), max_medias).await?;
            self.kind_medias(*kind, &raw, max_medias, tmdb).await
        }))
        .await?;

        Ok(data.into_iter().collect())
    }

    async fn fetch_anticipated_medias(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
    ) -> Result<KindMedias> {
        let source = Source::Anticipated.key();
        let kinds: Vec<TraktKind> = config
            .kinds(source)
            .into_iter()
            .filter(|kind| BASIC_KINDS.contains(kind))
            .collect();

        let data = try_join_all(kinds.iter().map(|kind| async move {
            let identifier = kind.identifier();
            let max_medias = config.max_medias(identifier, source);
            let ignore_collected = config.exclude_collected(identifier, source);
            let raw = self
                .trakt
                .fetch_anticipated(kind.path(), max_medias, ignore_collected)
                .await?;
            self.kind_medias(*kind, &raw, max_medias, tmdb).await
        }))
        .await?;

        Ok(data.into_iter().collect())
    }

    async fn kind_medias(
        &self,
        kind: TraktKind,
        raw: &Value,
        max_medias: usize,
        tmdb: Option<&TmdbClient>,
    ) -> Result<(TraktKind, Medias)> {
        let variant = kind.model().unwrap_or(MediaVariant::Show);
        let mut medias = medias_from_raw(as_items(raw), variant, kind.identifier());
        medias.truncate(max_medias);
        let medias = enrich_all(medias, tmdb).await;
        Ok((kind, Medias::new(medias)))
    }

    // ========== LISTS ==========

    /// Watched and collected IDs for the given media types, fetched concurrently.
    pub async fn fetch_collected_ids(&self, variants: &[MediaVariant]) -> Result<CollectedIds> {
        let requests: Vec<(MediaVariant, SyncSet)> = variants
            .iter()
            .flat_map(|v| [(*v, SyncSet::Watched), (*v, SyncSet::Collection)])
            .collect();

        let responses = try_join_all(
            requests
                .iter()
                .map(|(variant, set)| self.trakt.fetch_sync(*set, *variant)),
        )
        .await?;

        let mut collected = CollectedIds::default();
        for ((variant, _), items) in requests.iter().zip(&responses) {
            collected.extend_from_sync(*variant, items);
        }
        Ok(collected)
    }

    async fn fetch_lists(
        &self,
        config: &Configuration,
        tmdb: Option<&TmdbClient>,
    ) -> Result<BTreeMap<String, Medias>> {
        let lists = config.lists();

        // Watched/collected sets are shared by every list that needs them.
        let mut variants: Vec<MediaVariant> = lists
            .iter()
            .filter(|list| list.exclude_collected)
            .flat_map(|list| collected_types(list.media_type))
            .collect();
        variants.sort_by_key(|v| v.key());
        variants.dedup();

        let (collected, raw_lists) = tokio::try_join!(
            async {
                if variants.is_empty() {
                    Ok(CollectedIds::default())
                } else {
                    self.fetch_collected_ids(&variants).await
                }
            },
            try_join_all(lists.iter().map(|list| {
                self.trakt.fetch_list(
                    TraktKind::List.path(),
                    &list.list_id,
                    list.private_list,
                    list.media_type,
                )
            }))
        )?;

        let now = Utc::now();
        let processed = futures::future::join_all(
            lists
                .iter()
                .zip(raw_lists)
                .filter_map(|(list, raw)| raw.map(|raw| (list, raw)))
                .map(|(list, raw)| self.process_list(list, raw, &collected, now, tmdb)),
        )
        .await;

        Ok(processed.into_iter().flatten().collect())
    }

    async fn process_list(
        &self,
        list: &ListConfig,
        raw: Value,
        collected: &CollectedIds,
        now: DateTime<Utc>,
        tmdb: Option<&TmdbClient>,
    ) -> Option<(String, Medias)> {
        let medias = map_list_items(&raw, &list.friendly_name);
        if medias.is_empty() {
            tracing::warn!("No entries found for list {}", list.friendly_name);
            return None;
        }

        let medias = post_process(medias, list, Some(collected), now);
        let medias = enrich_all(medias, tmdb).await;
        Some((list.friendly_name.clone(), Medias::new(medias)))
    }

    // ========== STATS ==========

    async fn fetch_stats(&self) -> Result<Stats> {
        let data = self.trakt.fetch_stats().await?;
        Ok(flatten_stats(&data))
    }
}
