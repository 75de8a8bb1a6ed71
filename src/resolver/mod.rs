//! Identifier resolution: raw input to [`ContentReference`].
//!
//! Resolution runs in two stages:
//!
//! 1. Pattern matching ([`crate::parser::match_patterns`]), offline.
//! 2. Remote verification through [`MetadataApi`] when the pattern stage
//!    cannot give a canonical ID on its own:
//!    - handles, custom names and legacy usernames are always looked up;
//!    - unmatched inputs are confirmed as video, then playlist, then channel.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use yt_obsidian_core::http::{Interrupt, RetryPolicy};
//! use yt_obsidian_core::resolver::IdentifierResolver;
//! use yt_obsidian_core::youtube::YouTubeClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = YouTubeClient::new("key", RetryPolicy::default(), Interrupt::new(), Duration::from_secs(30))?;
//! let resolver = IdentifierResolver::new(Arc::new(api));
//! let reference = resolver.resolve("https://youtu.be/dQw4w9WgXcQ").await?;
//! println!("{reference}");
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::ResolveError;

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::parser::{
    ChannelLookup, ContentKind, ContentReference, PatternMatch, fallback_token, is_youtube_url,
    match_patterns, normalize_input,
};
use crate::youtube::MetadataApi;

/// Maps user input to typed content references.
#[derive(Clone)]
pub struct IdentifierResolver {
    api: Arc<dyn MetadataApi>,
}

impl std::fmt::Debug for IdentifierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifierResolver").finish_non_exhaustive()
    }
}

impl IdentifierResolver {
    /// Creates a resolver that confirms through `api`.
    #[must_use]
    pub fn new(api: Arc<dyn MetadataApi>) -> Self {
        Self { api }
    }

    /// Resolves one raw input.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Unresolved`] when nothing recognizes the input, or
    ///   remote confirmation finds nothing or gives up after retries
    /// - [`ResolveError::Fatal`] when the API rejects the credentials
    /// - [`ResolveError::Interrupted`] on Ctrl-C
    #[instrument(skip(self))]
    pub async fn resolve(&self, raw_input: &str) -> Result<ContentReference, ResolveError> {
        let input = normalize_input(raw_input);
        if input.is_empty() {
            return Err(ResolveError::empty_input());
        }

        match match_patterns(&input) {
            Some(PatternMatch::Canonical(reference)) => {
                debug!(kind = %reference.kind(), id = reference.id(), "resolved by pattern");
                Ok(reference)
            }
            Some(PatternMatch::ProvisionalChannel { lookup, source_url }) => {
                self.confirm_channel(&input, &lookup, source_url).await
            }
            None => self.confirm_unmatched(&input).await,
        }
    }

    /// Handles and names are never trusted without a lookup.
    async fn confirm_channel(
        &self,
        input: &str,
        lookup: &ChannelLookup,
        source_url: Option<String>,
    ) -> Result<ContentReference, ResolveError> {
        debug!(name = %lookup.display_name(), "confirming provisional channel");
        match self.api.lookup_channel(lookup).await {
            Ok(Some(channel_id)) => {
                info!(name = %lookup.display_name(), %channel_id, "channel confirmed");
                Ok(ContentReference::channel(channel_id)
                    .with_source_url(source_url)
                    .confirmed_remotely())
            }
            Ok(None) => Err(ResolveError::channel_not_found(input, lookup)),
            Err(error) => Err(ResolveError::from_lookup(input, error)),
        }
    }

    /// Tries each kind in [`ContentKind::CONFIRMATION_ORDER`]; first hit wins.
    async fn confirm_unmatched(&self, input: &str) -> Result<ContentReference, ResolveError> {
        let Some(token) = fallback_token(input) else {
            return Err(ResolveError::unrecognized(input));
        };
        let source_url = is_youtube_url(input).then(|| input.to_string());

        for kind in ContentKind::CONFIRMATION_ORDER {
            debug!(%kind, %token, "remote confirmation");
            match self.api.confirm_exists(kind, &token).await {
                Ok(Some(id)) => {
                    info!(%kind, %id, "confirmed remotely");
                    return Ok(ContentReference::new(kind, id)
                        .with_source_url(source_url)
                        .confirmed_remotely());
                }
                Ok(None) => {}
                Err(error) => return Err(ResolveError::from_lookup(input, error)),
            }
        }

        Err(ResolveError::not_found(input))
    }
}
