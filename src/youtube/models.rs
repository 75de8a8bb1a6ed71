//! YouTube Data API v3 response shapes.
//!
//! Only the fields the notes need are modelled; everything else is ignored.

use serde::Deserialize;

use super::{PlaylistSummary, VideoMetadata};

/// Any `*.list` response: one page of items plus an optional continuation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Resource returned with `part=id`.
#[derive(Debug, Deserialize)]
pub(crate) struct IdOnly {
    pub id: String,
}

// ==================== videos.list ====================

#[derive(Debug, Deserialize)]
pub(crate) struct VideoResource {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub thumbnails: Option<Thumbnails>,
    pub category_id: Option<String>,
    pub default_language: Option<String>,
    pub default_audio_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    pub url: String,
}

impl Thumbnails {
    /// Largest available thumbnail.
    fn best_url(&self) -> Option<String> {
        [
            &self.maxres,
            &self.standard,
            &self.high,
            &self.medium,
            &self.default,
        ]
        .into_iter()
        .flatten()
        .map(|thumbnail| thumbnail.url.clone())
        .find(|url| !url.is_empty())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<VideoResource> for VideoMetadata {
    fn from(resource: VideoResource) -> Self {
        let snippet = resource.snippet.unwrap_or_default();
        let thumbnail_url = snippet.thumbnails.as_ref().and_then(Thumbnails::best_url);
        Self {
            id: resource.id,
            title: non_empty(snippet.title),
            description: snippet.description.unwrap_or_default(),
            channel_id: non_empty(snippet.channel_id),
            channel_title: non_empty(snippet.channel_title),
            published_at: non_empty(snippet.published_at),
            tags: snippet.tags,
            thumbnail_url,
            category_id: non_empty(snippet.category_id),
            default_language: non_empty(snippet.default_language),
            default_audio_language: non_empty(snippet.default_audio_language),
        }
    }
}

// ==================== playlistItems.list ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemResource {
    pub content_details: Option<PlaylistItemContentDetails>,
    pub snippet: Option<PlaylistItemSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemSnippet {
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId {
    pub video_id: Option<String>,
}

impl PlaylistItemResource {
    /// Video ID from `contentDetails`, falling back to `snippet.resourceId`.
    pub fn video_id(self) -> Option<String> {
        let from_details = self.content_details.and_then(|details| details.video_id);
        let from_snippet = || {
            self.snippet
                .and_then(|snippet| snippet.resource_id)
                .and_then(|resource| resource.video_id)
        };
        non_empty(from_details).or_else(|| non_empty(from_snippet()))
    }
}

// ==================== playlists.list ====================

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistResource {
    pub id: String,
    pub snippet: Option<PlaylistSnippet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistSnippet {
    pub title: Option<String>,
}

impl From<PlaylistResource> for PlaylistSummary {
    fn from(resource: PlaylistResource) -> Self {
        Self {
            id: resource.id,
            title: non_empty(resource.snippet.and_then(|s| s.title)),
        }
    }
}

// ==================== search.list ====================

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResult {
    pub id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchId {
    pub channel_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_video_resource_maps_snippet_fields() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "title": "Never Gonna Give You Up",
                "description": "Official video",
                "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                "channelTitle": "Rick Astley",
                "publishedAt": "2009-10-25T06:57:33Z",
                "tags": ["rick astley", "80s"],
                "thumbnails": {
                    "default": {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg"},
                    "high": {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"}
                },
                "categoryId": "10",
                "defaultAudioLanguage": "en"
            }
        }"#;
        let resource: VideoResource = serde_json::from_str(json).unwrap();
        let metadata = VideoMetadata::from(resource);
        assert_eq!(metadata.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(metadata.channel_title.as_deref(), Some("Rick Astley"));
        assert_eq!(metadata.tags, vec!["rick astley", "80s"]);
        assert_eq!(
            metadata.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(metadata.category_id.as_deref(), Some("10"));
        assert_eq!(metadata.default_language, None);
    }

    #[test]
    fn test_video_resource_without_snippet_has_no_title() {
        let resource: VideoResource = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
        let metadata = VideoMetadata::from(resource);
        assert_eq!(metadata.title, None);
        assert!(metadata.description.is_empty());
    }

    #[test]
    fn test_blank_title_is_treated_as_missing() {
        let resource: VideoResource =
            serde_json::from_str(r#"{"id":"abc","snippet":{"title":"   "}}"#).unwrap();
        assert_eq!(VideoMetadata::from(resource).title, None);
    }

    #[test]
    fn test_playlist_item_video_id_fallback() {
        let from_details: PlaylistItemResource =
            serde_json::from_str(r#"{"contentDetails":{"videoId":"aaaaaaaaaaa"}}"#).unwrap();
        assert_eq!(from_details.video_id().as_deref(), Some("aaaaaaaaaaa"));

        let from_snippet: PlaylistItemResource = serde_json::from_str(
            r#"{"snippet":{"resourceId":{"kind":"youtube#video","videoId":"bbbbbbbbbbb"}}}"#,
        )
        .unwrap();
        assert_eq!(from_snippet.video_id().as_deref(), Some("bbbbbbbbbbb"));
    }

    #[test]
    fn test_list_response_defaults_items() {
        let page: ListResponse<IdOnly> = serde_json::from_str(r#"{"kind":"x"}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_search_result_channel_id() {
        let hit: SearchResult = serde_json::from_str(
            r#"{"id":{"kind":"youtube#channel","channelId":"UCabcdefghijklmnop"}}"#,
        )
        .unwrap();
        assert_eq!(hit.id.channel_id.as_deref(), Some("UCabcdefghijklmnop"));
    }
}
