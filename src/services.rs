//! Constructor composition of every client the run needs.
//!
//! [`Services::build`] is the only place concrete clients are chosen. The
//! resolver and pipeline receive them as trait objects, so tests can build
//! the same graph from fakes with [`IdentifierResolver::new`] and
//! [`Pipeline::new`].

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::AppConfig;
use crate::http::Interrupt;
use crate::pipeline::Pipeline;
use crate::resolver::IdentifierResolver;
use crate::summarizer::OpenAiCompatibleClient;
use crate::transcript::TranscriptClient;
use crate::youtube::{MetadataApi, YouTubeClient};

/// The wired-up resolver and pipeline for one run.
#[derive(Debug)]
pub struct Services {
    /// Input to reference.
    pub resolver: IdentifierResolver,
    /// Reference to notes.
    pub pipeline: Pipeline,
}

impl Services {
    /// Builds every client from `config`. All clients share one retry policy
    /// and one interrupt.
    ///
    /// # Errors
    ///
    /// Fails when an HTTP client cannot be constructed or a configured URL is
    /// unusable.
    pub fn build(config: &AppConfig, interrupt: &Interrupt) -> Result<Self> {
        let policy = config.retry_policy();
        debug!(
            max_attempts = policy.max_attempts(),
            initial_delay_ms = policy.initial_delay().as_millis(),
            max_delay_ms = policy.max_delay().as_millis(),
            "retry policy"
        );

        let metadata: Arc<dyn MetadataApi> = Arc::new(
            YouTubeClient::with_base_url(
                config.youtube_api_key.clone(),
                config.youtube_api_base_url.clone(),
                policy.clone(),
                interrupt.clone(),
                config.request_timeout,
            )
            .context("Failed to create metadata API client")?,
        );
        let transcripts = Arc::new(
            TranscriptClient::new(
                config.transcript_base_url.clone(),
                config.transcript_language.clone(),
                policy.clone(),
                interrupt.clone(),
                config.request_timeout,
            )
            .context("Failed to create transcript client")?,
        );
        let summarizer = Arc::new(
            OpenAiCompatibleClient::new(
                &config.ai_endpoint,
                config.ai_api_key.clone(),
                config.model.clone(),
                config.max_keywords,
                policy,
                interrupt.clone(),
            )
            .context("Failed to create AI summarizer client")?,
        );

        Ok(Self {
            resolver: IdentifierResolver::new(Arc::clone(&metadata)),
            pipeline: Pipeline::new(
                metadata,
                transcripts,
                summarizer,
                config.default_author.clone(),
                interrupt.clone(),
            ),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_minimal_config() {
        let config = AppConfig::from_lookup(|key| (key == "YOUTUBE_API_KEY").then(|| "k".to_string())).unwrap();
        let services = Services::build(&config, &Interrupt::new()).unwrap();
        let debug = format!("{services:?}");
        assert!(debug.contains("IdentifierResolver"), "{debug}");
        assert!(debug.contains("Unknown Channel"), "{debug}");
    }
}
