//! Timed-text transcript retrieval.
//!
//! Captions are fetched from the timed-text endpoint in `json3` format and
//! rendered as one `[mm:ss] text` line per caption event. A missing transcript
//! is not an error: it is `Ok(None)`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::http::{ApiError, Interrupt, RetryError, RetryPolicy, build_http_client, execute, send_text};

/// Default timed-text host.
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Default caption language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Source of transcript text for a video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Formatted transcript, or `None` when the video has no captions.
    async fn transcript(&self, video_id: &str) -> Result<Option<String>, RetryError<ApiError>>;
}

/// Client for the timed-text endpoint.
pub struct TranscriptClient {
    client: Client,
    base_url: String,
    language: String,
    policy: RetryPolicy,
    interrupt: Interrupt,
}

impl TranscriptClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for an unusable base URL, or
    /// [`ApiError::ClientBuild`] if HTTP client construction fails.
    pub fn new(
        base_url: impl Into<String>,
        language: impl Into<String>,
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
            language: language.into(),
            policy,
            interrupt,
        })
    }
}

impl std::fmt::Debug for TranscriptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptClient")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TranscriptSource for TranscriptClient {
    #[instrument(skip(self), fields(language = %self.language))]
    async fn transcript(&self, video_id: &str) -> Result<Option<String>, RetryError<ApiError>> {
        let endpoint = format!("{}/api/timedtext", self.base_url);
        let mut request_url = Url::parse(&endpoint).map_err(|_| RetryError::Fatal {
            attempt: 1,
            source: ApiError::invalid_url(&endpoint),
        })?;
        request_url
            .query_pairs_mut()
            .append_pair("v", video_id)
            .append_pair("lang", &self.language)
            .append_pair("fmt", "json3");

        let body = match execute(&self.policy, &self.interrupt, "timedtext", |_| {
            send_text(self.client.get(request_url.clone()), &endpoint)
        })
        .await
        {
            Ok(body) => body,
            Err(RetryError::Fatal { source, .. }) if source.is_not_found() => {
                debug!(video_id, "no caption track");
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        if body.trim().is_empty() {
            debug!(video_id, "empty caption response");
            return Ok(None);
        }

        let parsed: TimedText = serde_json::from_str(&body).map_err(|e| RetryError::Fatal {
            attempt: 1,
            source: ApiError::decode(&endpoint, e.to_string()),
        })?;
        Ok(format_transcript(&parsed))
    }
}

// ==================== json3 format ====================

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<CaptionEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionEvent {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    segs: Vec<CaptionSegment>,
}

#[derive(Debug, Deserialize)]
struct CaptionSegment {
    #[serde(default)]
    utf8: String,
}

/// Renders caption events as `[mm:ss] text` lines; `None` if nothing is left.
fn format_transcript(timed_text: &TimedText) -> Option<String> {
    let lines: Vec<String> = timed_text
        .events
        .iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then(|| format!("[{}] {text}", format_timestamp(event.t_start_ms)))
        })
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// `mm:ss` with minutes allowed past 59 (`[75:03]`).
#[must_use]
pub fn format_timestamp(start_ms: u64) -> String {
    let total_secs = start_ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
