//! Metadata access for videos, playlists and channels.
//!
//! [`MetadataApi`] is the seam the resolver and pipeline depend on;
//! [`YouTubeClient`] implements it against the YouTube Data API v3. Every
//! call goes through the shared retry executor.

mod client;
mod models;

use async_trait::async_trait;

use crate::http::{ApiError, RetryError};
use crate::parser::{ChannelLookup, ContentKind};

pub use client::{DEFAULT_BASE_URL, VIDEO_BATCH_SIZE, YouTubeClient};

/// Basic fields of one video as reported by the metadata API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    /// Canonical video ID.
    pub id: String,
    /// Title; `None` when the API omitted it or sent a blank one.
    pub title: Option<String>,
    /// Description (may be empty).
    pub description: String,
    /// Owning channel ID.
    pub channel_id: Option<String>,
    /// Owning channel display name.
    pub channel_title: Option<String>,
    /// RFC 3339 publish timestamp.
    pub published_at: Option<String>,
    /// Uploader tags.
    pub tags: Vec<String>,
    /// Largest thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// Category ID.
    pub category_id: Option<String>,
    /// Metadata language.
    pub default_language: Option<String>,
    /// Audio language.
    pub default_audio_language: Option<String>,
}

/// One playlist owned by a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    /// Playlist ID.
    pub id: String,
    /// Playlist title, if present.
    pub title: Option<String>,
}

/// Read access to the metadata API.
///
/// Results keep the API's native ordering. Errors are already retry-governed:
/// transient failures have been retried per policy before surfacing.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// Details for `ids`; videos the API does not return are simply absent.
    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoMetadata>, RetryError<ApiError>>;

    /// Every video ID in a playlist, across all pages.
    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, RetryError<ApiError>>;

    /// Every playlist owned by a channel, across all pages.
    async fn channel_playlists(
        &self,
        channel_id: &str,
    ) -> Result<Vec<PlaylistSummary>, RetryError<ApiError>>;

    /// Returns the canonical ID when `id` exists as `kind`, `None` otherwise.
    async fn confirm_exists(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<Option<String>, RetryError<ApiError>>;

    /// Resolves a handle, custom name or legacy username to a `UC…` ID.
    async fn lookup_channel(
        &self,
        lookup: &ChannelLookup,
    ) -> Result<Option<String>, RetryError<ApiError>>;
}
