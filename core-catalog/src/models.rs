//! Catalog API models.
//!
//! Field names mirror the backend's JSON (camelCase). Joined relations
//! (`artist`, `album`) are optional: list endpoints include them, some nested
//! payloads do not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artist fields included when a track or album embeds its artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// Album fields included when a track embeds its album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: String,
    pub title: String,
    pub cover_url: Option<String>,
}

/// Full artist record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full album record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub cover_url: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub artist: Option<ArtistSummary>,
}

/// Full track record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub album_id: Option<String>,
    pub artist_id: String,
    /// Catalog-reported duration in seconds. Advisory; the engine reports the
    /// actual duration once the source is loaded.
    pub duration: u32,
    pub audio_url: String,
    pub track_number: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub artist: Option<ArtistSummary>,
    pub album: Option<AlbumSummary>,
}

/// Playlist record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A track inside a playlist, with the time it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub track: Track,
    pub added_at: DateTime<Utc>,
}

/// Body for creating or updating a playlist.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Immutable reference to a playable item, the unit the player session queues.
///
/// This is the display-plus-source projection of a [`Track`]: exactly the
/// fields transport controls and the now-playing surface need, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub id: String,
    pub title: String,
    pub artist_name: String,
    pub artist_id: String,
    /// Advisory duration in seconds from the catalog.
    pub duration_secs: u32,
    pub source_url: String,
    pub album_id: Option<String>,
    pub cover_url: Option<String>,
}

impl Track {
    /// Project this track into a [`TrackRef`].
    ///
    /// `fallback_cover` supplies artwork when the track carries no embedded
    /// album (e.g., when playing from an album page, the page's cover).
    /// Missing artist joins degrade to a placeholder name rather than failing.
    pub fn to_track_ref(&self, fallback_cover: Option<&str>) -> TrackRef {
        TrackRef {
            id: self.id.clone(),
            title: self.title.clone(),
            artist_name: self
                .artist
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown artist".to_string()),
            artist_id: self.artist_id.clone(),
            duration_secs: self.duration,
            source_url: self.audio_url.clone(),
            album_id: self.album_id.clone(),
            cover_url: self
                .album
                .as_ref()
                .and_then(|a| a.cover_url.clone())
                .or_else(|| fallback_cover.map(|c| c.to_string())),
        }
    }
}
