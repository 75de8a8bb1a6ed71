//! Error types for outbound HTTP calls.
//!
//! One request to the metadata API, the transcript host or the AI endpoint
//! fails with exactly one [`ApiError`]. Whether that failure is worth a retry
//! is decided separately by [`super::classify_error`].

use thiserror::Error;

/// Errors that can occur during a single outbound request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}{}", reason_suffix(.reason.as_deref()))]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Machine-readable reason from the API error body, if any
        /// (e.g. `quotaExceeded`, `playlistNotFound`).
        reason: Option<String>,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("unexpected response from {url}: {detail}")]
    Decode {
        /// The URL whose response was malformed.
        url: String,
        /// What was wrong with it.
        detail: String,
    },

    /// The configured endpoint is not a usable URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client itself could not be constructed.
    #[error("HTTP client construction failed: {detail}")]
    ClientBuild {
        /// Builder failure description.
        detail: String,
    },
}

fn reason_suffix(reason: Option<&str>) -> String {
    reason.map(|r| format!(" ({r})")).unwrap_or_default()
}

impl ApiError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            return Self::Timeout { url };
        }
        Self::Network { url, source }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            reason: None,
        }
    }

    /// Creates an HTTP status error carrying the API's reason code.
    pub fn http_status_with_reason(
        url: impl Into<String>,
        status: u16,
        reason: Option<String>,
    ) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            reason,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a client construction error.
    pub fn client_build(detail: impl Into<String>) -> Self {
        Self::ClientBuild {
            detail: detail.into(),
        }
    }

    /// Returns the HTTP status if this is a status error.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server says the resource does not exist (404/410).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404 | 410))
    }

    /// True when the API refuses this one resource (private, closed or
    /// suspended) rather than the caller's credentials.
    #[must_use]
    pub fn is_content_restricted(&self) -> bool {
        match self {
            Self::HttpStatus {
                status: 403,
                reason: Some(reason),
                ..
            } => is_content_restriction_reason(reason),
            _ => false,
        }
    }

    /// Not found, or withheld from everyone but its owner.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.is_not_found() || self.is_content_restricted()
    }
}

/// 403 reasons YouTube uses for resources the key may not see.
pub(crate) fn is_content_restriction_reason(reason: &str) -> bool {
    matches!(
        reason,
        "forbidden"
            | "playlistItemsNotAccessible"
            | "playlistForbidden"
            | "channelClosed"
            | "channelSuspended"
            | "videoForbidden"
            | "subscriptionForbidden"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_timeout_display() {
        let error = ApiError::timeout("https://www.googleapis.com/youtube/v3/videos");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("/youtube/v3/videos"));
    }

    #[test]
    fn test_api_error_http_status_display_without_reason() {
        let error = ApiError::http_status("https://example.com/v1/chat/completions", 503);
        let msg = error.to_string();
        assert!(msg.contains("503"), "Expected '503' in: {msg}");
        assert!(!msg.contains('('), "No reason suffix expected in: {msg}");
    }

    #[test]
    fn test_api_error_http_status_display_with_reason() {
        let error = ApiError::http_status_with_reason(
            "https://example.com/playlistItems",
            404,
            Some("playlistNotFound".to_string()),
        );
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected status in: {msg}");
        assert!(msg.contains("(playlistNotFound)"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_api_error_decode_display() {
        let error = ApiError::decode("https://example.com", "missing field `items`");
        assert!(error.to_string().contains("missing field `items`"));
    }

    #[test]
    fn test_api_error_is_not_found() {
        assert!(ApiError::http_status("u", 404).is_not_found());
        assert!(ApiError::http_status("u", 410).is_not_found());
        assert!(!ApiError::http_status("u", 403).is_not_found());
        assert!(!ApiError::timeout("u").is_not_found());
    }

    #[test]
    fn test_api_error_content_restriction_is_unavailable() {
        for reason in ["playlistItemsNotAccessible", "forbidden", "channelClosed", "channelSuspended"] {
            let error = ApiError::http_status_with_reason("u", 403, Some(reason.to_string()));
            assert!(error.is_content_restricted(), "{reason}");
            assert!(error.is_unavailable(), "{reason}");
        }
        let key = ApiError::http_status_with_reason("u", 403, Some("keyInvalid".to_string()));
        assert!(!key.is_unavailable());
        assert!(!ApiError::http_status("u", 403).is_unavailable());
        assert!(ApiError::http_status("u", 404).is_unavailable());
    }
}
