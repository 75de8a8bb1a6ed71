//! Input parsing: turns user-supplied text into typed content references.
//!
//! Recognition is pattern-only and never touches the network. Inputs that
//! name a channel by handle, custom name or legacy username come back as
//! [`PatternMatch::ProvisionalChannel`]; the resolver confirms those remotely.
//!
//! # Supported Shapes
//!
//! - Videos: `watch?v=`, `youtu.be/`, `embed/`, `shorts/`, `m.youtube.com`,
//!   `v/`, `web/` (and `live/`), bare 11-character IDs
//! - Playlists: `playlist?list=`, `watch?list=` without a video, bare `PL…` IDs
//! - Channels: `channel/UC…`, `c/<name>`, `user/<name>`, `@handle`, bare `UC…` IDs
//!
//! # Example
//!
//! ```
//! use yt_obsidian_core::parser::{ContentKind, PatternMatch, match_patterns, normalize_input};
//!
//! let input = normalize_input(" youtu.be/dQw4w9WgXcQ ");
//! match match_patterns(&input) {
//!     Some(PatternMatch::Canonical(reference)) => {
//!         assert_eq!(reference.kind(), ContentKind::Video);
//!         assert_eq!(reference.id(), "dQw4w9WgXcQ");
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

mod reference;
mod url;

pub use reference::{
    ChannelLookup, ContentKind, ContentReference, PatternMatch, ReferenceOrigin,
};
pub use url::{
    MAX_INPUT_LENGTH, canonical_host, fallback_token, is_video_id, is_youtube_url,
    match_patterns, normalize_input,
};
