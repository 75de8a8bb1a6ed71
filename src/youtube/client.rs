//! YouTube Data API v3 client.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use crate::http::{ApiError, Interrupt, RetryError, RetryPolicy, build_http_client, execute, send_json};
use crate::parser::{ChannelLookup, ContentKind};

use super::models::{
    IdOnly, ListResponse, PlaylistItemResource, PlaylistResource, SearchResult, VideoResource,
};
use super::{MetadataApi, PlaylistSummary, VideoMetadata};

/// Default metadata API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// The API accepts at most this many IDs per `videos.list` call.
pub const VIDEO_BATCH_SIZE: usize = 50;

const PAGE_SIZE: &str = "50";

type Query = Vec<(&'static str, String)>;

/// Metadata client backed by the YouTube Data API.
///
/// The API key travels as the `key` query parameter and is never included in
/// error messages or logs; those carry only the endpoint path.
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
    policy: RetryPolicy,
    interrupt: Interrupt,
}

impl YouTubeClient {
    /// Creates a client against the public API.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if HTTP client construction fails.
    pub fn new(
        api_key: impl Into<String>,
        policy: RetryPolicy,
        interrupt: Interrupt,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, policy, interrupt, request_timeout)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for an unusable base URL, or
    /// [`ApiError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        policy: RetryPolicy,
        interrupt: Interrupt,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if Url::parse(&base_url).is_err() {
            return Err(ApiError::invalid_url(base_url));
        }
        Ok(Self {
            client: build_http_client(request_timeout)?,
            base_url,
            api_key: api_key.into(),
            policy,
            interrupt,
        })
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{resource}", self.base_url)
    }

    /// One retry-governed GET against `resource`.
    async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &Query,
    ) -> Result<T, RetryError<ApiError>> {
        let url = self.endpoint(resource);
        let mut request_url =
            Url::parse(&url).map_err(|_| RetryError::Fatal {
                attempt: 1,
                source: ApiError::invalid_url(&url),
            })?;
        request_url
            .query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
            .append_pair("key", &self.api_key);

        execute(&self.policy, &self.interrupt, resource, |_| {
            send_json::<T>(self.client.get(request_url.clone()), &url)
        })
        .await
    }

    /// Follows `nextPageToken` until the listing is exhausted.
    async fn paginate<T: DeserializeOwned>(
        &self,
        resource: &str,
        base_query: Query,
    ) -> Result<Vec<T>, RetryError<ApiError>> {
        let mut items = Vec::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = base_query.clone();
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }
            let page: ListResponse<T> = self.get(resource, &query).await?;
            items.extend(page.items);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) if seen_tokens.insert(token.clone()) => page_token = Some(token),
                Some(token) => {
                    debug!(resource, %token, "page token repeated; stopping pagination");
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }

    async fn first_id(&self, resource: &str, query: Query) -> Result<Option<String>, RetryError<ApiError>> {
        let page: ListResponse<IdOnly> = self.get(resource, &query).await?;
        Ok(page.items.into_iter().next().map(|item| item.id))
    }

    async fn search_channel(&self, name: &str) -> Result<Option<String>, RetryError<ApiError>> {
        let query = vec![
            ("part", "id".to_string()),
            ("type", "channel".to_string()),
            ("maxResults", "1".to_string()),
            ("q", name.to_string()),
        ];
        let page: ListResponse<SearchResult> = self.get("search", &query).await?;
        Ok(page
            .items
            .into_iter()
            .next()
            .and_then(|hit| hit.id.channel_id))
    }
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataApi for YouTubeClient {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoMetadata>, RetryError<ApiError>> {
        let mut videos = Vec::with_capacity(ids.len());
        for batch in ids.chunks(VIDEO_BATCH_SIZE) {
            let query = vec![
                ("part", "snippet".to_string()),
                ("id", batch.join(",")),
                ("maxResults", PAGE_SIZE.to_string()),
            ];
            let page: ListResponse<VideoResource> = self.get("videos", &query).await?;
            debug!(requested = batch.len(), returned = page.items.len(), "fetched video batch");
            videos.extend(page.items.into_iter().map(VideoMetadata::from));
        }
        Ok(videos)
    }

    #[instrument(skip(self))]
    async fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, RetryError<ApiError>> {
        let query = vec![
            ("part", "snippet,contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        let items: Vec<PlaylistItemResource> = self.paginate("playlistItems", query).await?;
        let ids: Vec<String> = items
            .into_iter()
            .filter_map(PlaylistItemResource::video_id)
            .collect();
        info!(playlist_id, count = ids.len(), "listed playlist videos");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn channel_playlists(
        &self,
        channel_id: &str,
    ) -> Result<Vec<PlaylistSummary>, RetryError<ApiError>> {
        let query = vec![
            ("part", "snippet".to_string()),
            ("channelId", channel_id.to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
        ];
        let items: Vec<PlaylistResource> = self.paginate("playlists", query).await?;
        info!(channel_id, count = items.len(), "listed channel playlists");
        Ok(items.into_iter().map(PlaylistSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn confirm_exists(
        &self,
        kind: ContentKind,
        id: &str,
    ) -> Result<Option<String>, RetryError<ApiError>> {
        let resource = match kind {
            ContentKind::Video => "videos",
            ContentKind::Playlist => "playlists",
            ContentKind::Channel => "channels",
        };
        let query = vec![("part", "id".to_string()), ("id", id.to_string())];
        match self.first_id(resource, query).await {
            // Unknown or malformed IDs come back as 400/404 for some resources.
            Err(RetryError::Fatal { source, .. }) if matches!(source.status(), Some(400 | 404 | 410)) => {
                debug!(%kind, id, error = %source, "not confirmed");
                Ok(None)
            }
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn lookup_channel(
        &self,
        lookup: &ChannelLookup,
    ) -> Result<Option<String>, RetryError<ApiError>> {
        match lookup {
            ChannelLookup::Handle(handle) => {
                let query = vec![("part", "id".to_string()), ("forHandle", format!("@{handle}"))];
                self.first_id("channels", query).await
            }
            ChannelLookup::CustomName(name) | ChannelLookup::LegacyUser(name) => {
                let query = vec![("part", "id".to_string()), ("forUsername", name.clone())];
                if let Some(id) = self.first_id("channels", query).await? {
                    return Ok(Some(id));
                }
                debug!(%name, "username lookup empty; searching channels");
                self.search_channel(name).await
            }
        }
    }
}
