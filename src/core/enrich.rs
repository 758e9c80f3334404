//! TMDB enrichment.
//!
//! Enrichment never mutates a shared record: [`merge_details`] takes the
//! Trakt-built media and returns a new one with TMDB fields overlaid.

use crate::models::kind::MediaVariant;
use crate::models::media::Media;
use crate::services::tmdb::{image_url, MediaDetails, TmdbClient};
use crate::utils::dates::{parse_utc_date, sentinel_min};
use futures::future::join_all;

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Overlay TMDB details and trailer onto a media.
///
/// A field is replaced only when TMDB provides a non-empty value. The release
/// date is backfilled only when Trakt had none, and falls back to the sentinel
/// when TMDB has none either, so the result always has a release date.
pub fn merge_details(media: Media, details: &MediaDetails, trailer: Option<String>) -> Media {
    let mut merged = media;
    let variant = merged.variant();

    let title = match variant {
        MediaVariant::Movie => non_empty(&details.title),
        MediaVariant::Show => non_empty(&details.name),
    };
    if let Some(title) = title {
        merged.name = title;
    }
    if let Some(trailer) = trailer {
        merged.trailer = Some(trailer);
    }
    if let Some(summary) = non_empty(&details.overview) {
        merged.summary = Some(summary);
    }
    if let Some(poster) = non_empty(&details.poster_path) {
        merged.poster = Some(image_url(&poster));
    }
    if let Some(fanart) = non_empty(&details.backdrop_path) {
        merged.fanart = Some(image_url(&fanart));
    }
    if let Some(genres) = details.genres.as_ref().filter(|g| !g.is_empty()) {
        merged.genres = genres.iter().map(|g| g.name.clone()).collect();
    }
    if let Some(vote) = details.vote_average.filter(|v| *v != 0.0) {
        merged.rating = Some(vote);
    }

    let studios = match variant {
        MediaVariant::Movie => &details.production_companies,
        MediaVariant::Show => &details.networks,
    };
    if let Some(studio) = studios
        .as_ref()
        .and_then(|s| s.first())
        .and_then(|c| non_empty(&c.name))
    {
        merged.studio = Some(studio);
    }

    if variant == MediaVariant::Movie {
        if let Some(runtime) = details.runtime.filter(|r| *r != 0) {
            merged.runtime = Some(runtime);
        }
    }

    if merged.released.is_none() {
        let date = match variant {
            MediaVariant::Movie => &details.release_date,
            MediaVariant::Show => &details.first_air_date,
        };
        merged.released = Some(parse_utc_date(date.as_deref()).unwrap_or_else(sentinel_min));
    }

    merged
}

/// Enrich one media with its details and videos, fetched concurrently.
///
/// Lookup failures are logged and leave the Trakt data untouched apart from
/// the release-date fallback.
pub async fn enrich(media: Media, tmdb: Option<&TmdbClient>) -> Media {
    let variant = media.variant();
    let (Some(client), Some(tmdb_id)) = (tmdb, media.ids.tmdb) else {
        return merge_details(media, &MediaDetails::default(), None);
    };

    let (details, videos) = tokio::join!(
        client.get_details(variant, tmdb_id),
        client.get_videos(variant, tmdb_id)
    );

    let details = details.unwrap_or_else(|e| {
        tracing::warn!("TMDB details for {} ({}) failed: {}", media.name, tmdb_id, e);
        MediaDetails::default()
    });
    let trailer = match videos {
        Ok(videos) => videos.trailer_url(),
        Err(e) => {
            tracing::warn!("TMDB videos for {} ({}) failed: {}", media.name, tmdb_id, e);
            None
        }
    };

    merge_details(media, &details, trailer)
}

/// Enrich every media of a category concurrently, keeping the input order.
pub async fn enrich_all(medias: Vec<Media>, tmdb: Option<&TmdbClient>) -> Vec<Media> {
    join_all(medias.into_iter().map(|media| enrich(media, tmdb))).await
}
