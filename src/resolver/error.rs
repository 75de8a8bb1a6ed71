//! Error types for identifier resolution.
//!
//! Follows the What/Why/Fix message pattern used across the project.

use thiserror::Error;

use crate::http::{ApiError, FailureType, RetryClassify, RetryError};
use crate::parser::ChannelLookup;

/// Errors that can occur while resolving a user-supplied identifier.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither pattern matching nor remote verification recognized the input.
    #[error("could not resolve '{input}': {reason}\n  Suggestion: {suggestion}")]
    Unresolved {
        /// The input as supplied.
        input: String,
        /// Why resolution failed.
        reason: String,
        /// How to fix the issue.
        suggestion: String,
    },

    /// The metadata API refused the lookup; every further lookup would fail too.
    #[error(
        "metadata lookup for '{input}' was rejected: {source}\n  Suggestion: Check YOUTUBE_API_KEY and the key's remaining daily quota"
    )]
    Fatal {
        /// The input being resolved.
        input: String,
        /// The rejected request.
        #[source]
        source: ApiError,
    },

    /// The run was interrupted during a lookup.
    #[error("interrupted while resolving '{input}'")]
    Interrupted {
        /// The input being resolved.
        input: String,
    },
}

impl ResolveError {
    /// Empty input after normalization.
    #[must_use]
    pub fn empty_input() -> Self {
        Self::Unresolved {
            input: String::new(),
            reason: "input is empty".to_string(),
            suggestion: "Pass a YouTube URL, a video/playlist/channel ID or an @handle".to_string(),
        }
    }

    /// Input that is not shaped like anything worth looking up.
    #[must_use]
    pub fn unrecognized(input: &str) -> Self {
        Self::Unresolved {
            input: input.to_string(),
            reason: "not a recognized YouTube URL or ID".to_string(),
            suggestion:
                "Use a youtube.com / youtu.be URL, an 11-character video ID, a PL… playlist ID, a UC… channel ID or an @handle"
                    .to_string(),
        }
    }

    /// The API did not confirm the token as any content kind.
    #[must_use]
    pub fn not_found(input: &str) -> Self {
        Self::Unresolved {
            input: input.to_string(),
            reason: "the metadata API did not confirm it as a video, playlist or channel".to_string(),
            suggestion: "Check the ID for typos; private and deleted content cannot be resolved"
                .to_string(),
        }
    }

    /// A handle or channel name the API does not know.
    #[must_use]
    pub fn channel_not_found(input: &str, lookup: &ChannelLookup) -> Self {
        Self::Unresolved {
            input: input.to_string(),
            reason: format!("no channel found for '{}'", lookup.display_name()),
            suggestion: "Check the handle spelling or use the channel's UC… ID".to_string(),
        }
    }

    /// Maps a failed lookup call onto the resolution taxonomy.
    ///
    /// Exhausted retries and permanent request failures leave the input
    /// unresolved; authentication failures are fatal for the run.
    #[must_use]
    pub fn from_lookup(input: &str, error: RetryError<ApiError>) -> Self {
        match error {
            RetryError::Interrupted { .. } => Self::Interrupted {
                input: input.to_string(),
            },
            RetryError::Fatal { source, .. } if source.failure_type() == FailureType::NeedsAuth => {
                Self::Fatal {
                    input: input.to_string(),
                    source,
                }
            }
            RetryError::Fatal { source, .. } => Self::Unresolved {
                input: input.to_string(),
                reason: format!("lookup failed: {source}"),
                suggestion: "Check the input; the metadata API rejected the request".to_string(),
            },
            RetryError::Exhausted { attempts, last } => Self::Unresolved {
                input: input.to_string(),
                reason: format!("lookup gave up after {attempts} attempt(s): {last}"),
                suggestion: "Check your network connection or raise MAX_RETRIES and try again"
                    .to_string(),
            },
        }
    }

    /// True when the run must stop (fatal API rejection or interrupt).
    #[must_use]
    pub fn aborts_run(&self) -> bool {
        matches!(self, Self::Fatal { .. } | Self::Interrupted { .. })
    }
}
