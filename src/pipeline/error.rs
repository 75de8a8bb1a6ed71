//! Error types for the processing pipeline.
//!
//! [`ItemError`] fails one video and lets its siblings continue. [`RunError`]
//! stops the whole run.

use thiserror::Error;

use crate::http::{ApiError, FailureType, RetryClassify, RetryError};
use crate::note::NoteError;

/// Failure of a single item.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The item exists conceptually but the API will not serve it (deleted,
    /// private or region-blocked).
    #[error("{kind} {id} is unavailable: {reason}")]
    Unavailable {
        /// `video`, `playlist` or `channel`.
        kind: &'static str,
        /// Item ID.
        id: String,
        /// What the API reported.
        reason: String,
    },

    /// A required field was absent, so no note can be written.
    #[error("video {video_id} has no {field}\n  Suggestion: The video may have been removed; check it in a browser")]
    MissingField {
        /// Video ID.
        video_id: String,
        /// Missing field name.
        field: &'static str,
    },

    /// A remote call failed after the retry policy was applied.
    #[error("{stage} failed for {id}: {source}")]
    Remote {
        /// Pipeline stage (`metadata`, `playlist`, `summary`).
        stage: &'static str,
        /// Item ID.
        id: String,
        /// Retry outcome.
        #[source]
        source: RetryError<ApiError>,
    },

    /// A batched request covering this item failed.
    #[error("{stage} failed for {id}: {reason}")]
    Batch {
        /// Pipeline stage.
        stage: &'static str,
        /// Item ID.
        id: String,
        /// Rendered batch error.
        reason: String,
    },

    /// The note could not be written.
    #[error(transparent)]
    Note(#[from] NoteError),
}

impl ItemError {
    /// Unavailability constructor.
    #[must_use]
    pub fn unavailable(kind: &'static str, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            kind,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True for [`ItemError::Unavailable`].
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Failure that stops the run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Authentication or configuration rejected by a remote service; every
    /// further call would fail the same way.
    #[error("{stage} request was rejected: {source}\n  Suggestion: Check YOUTUBE_API_KEY, API_KEY and API_ENDPOINT, and the API key's remaining quota")]
    Fatal {
        /// Pipeline stage that hit the error.
        stage: &'static str,
        /// Rejected request.
        #[source]
        source: ApiError,
    },

    /// The user interrupted the run.
    #[error("interrupted")]
    Interrupted,
}

/// Splits a retry error into "stop the run" and "fail this item".
///
/// # Errors
///
/// Returns [`RunError`] for interrupts and authentication failures.
pub(crate) fn triage(
    stage: &'static str,
    error: RetryError<ApiError>,
) -> Result<RetryError<ApiError>, RunError> {
    match error {
        RetryError::Interrupted { .. } => Err(RunError::Interrupted),
        RetryError::Fatal { source, .. } if source.failure_type() == FailureType::NeedsAuth => {
            Err(RunError::Fatal { stage, source })
        }
        other => Ok(other),
    }
}
