//! Typed pointers to YouTube content produced by pattern matching.

use std::fmt;

/// The three kinds of content the tool can turn into notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// A single video.
    Video,
    /// A playlist; expands to its videos.
    Playlist,
    /// A channel; expands to its playlists, then their videos.
    Channel,
}

impl ContentKind {
    /// Lowercase name used in logs and the dry-run plan.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Playlist => "playlist",
            Self::Channel => "channel",
        }
    }

    /// Kinds in the order they are tried during remote confirmation.
    pub const CONFIRMATION_ORDER: [Self; 3] = [Self::Video, Self::Playlist, Self::Channel];
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a reference's kind was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOrigin {
    /// Recognized from a canonical ID shape; not checked against the API.
    Pattern,
    /// Confirmed (or discovered) by the metadata API.
    Remote,
}

/// Resolved, typed pointer to a video, playlist or channel.
///
/// Immutable once resolved: the resolver builds it, the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    kind: ContentKind,
    id: String,
    source_url: Option<String>,
    secondary_playlist: Option<String>,
    origin: ReferenceOrigin,
}

impl ContentReference {
    /// Creates a pattern-matched reference.
    #[must_use]
    pub fn new(kind: ContentKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            source_url: None,
            secondary_playlist: None,
            origin: ReferenceOrigin::Pattern,
        }
    }

    /// Shorthand for a video reference.
    #[must_use]
    pub fn video(id: impl Into<String>) -> Self {
        Self::new(ContentKind::Video, id)
    }

    /// Shorthand for a playlist reference.
    #[must_use]
    pub fn playlist(id: impl Into<String>) -> Self {
        Self::new(ContentKind::Playlist, id)
    }

    /// Shorthand for a channel reference.
    #[must_use]
    pub fn channel(id: impl Into<String>) -> Self {
        Self::new(ContentKind::Channel, id)
    }

    /// Records the URL the reference was parsed from.
    #[must_use]
    pub fn with_source_url(mut self, source_url: Option<String>) -> Self {
        self.source_url = source_url;
        self
    }

    /// Records a playlist carried alongside a video (`watch?v=..&list=..`).
    #[must_use]
    pub fn with_secondary_playlist(mut self, playlist_id: Option<String>) -> Self {
        self.secondary_playlist = playlist_id;
        self
    }

    /// Marks the reference as confirmed by the metadata API.
    #[must_use]
    pub fn confirmed_remotely(mut self) -> Self {
        self.origin = ReferenceOrigin::Remote;
        self
    }

    /// The content kind.
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// The canonical ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The URL the user supplied, if the input was a URL.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Playlist ID carried by a video URL, if any.
    #[must_use]
    pub fn secondary_playlist(&self) -> Option<&str> {
        self.secondary_playlist.as_deref()
    }

    /// Whether the kind came from pattern matching or the API.
    #[must_use]
    pub fn origin(&self) -> ReferenceOrigin {
        self.origin
    }

    /// Canonical youtube.com URL for this reference.
    #[must_use]
    pub fn canonical_url(&self) -> String {
        match self.kind {
            ContentKind::Video => format!("https://www.youtube.com/watch?v={}", self.id),
            ContentKind::Playlist => format!("https://www.youtube.com/playlist?list={}", self.id),
            ContentKind::Channel => format!("https://www.youtube.com/channel/{}", self.id),
        }
    }
}

impl fmt::Display for ContentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A channel name that must be looked up to obtain the canonical `UC…` ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelLookup {
    /// `@handle` (stored without the `@`).
    Handle(String),
    /// `/c/CustomName`.
    CustomName(String),
    /// `/user/LegacyName`.
    LegacyUser(String),
}

impl ChannelLookup {
    /// The name as the user wrote it, for messages.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Handle(name) => format!("@{name}"),
            Self::CustomName(name) | Self::LegacyUser(name) => name.clone(),
        }
    }
}

/// Result of running the ordered recognizers over one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternMatch {
    /// A canonical ID shape; usable as-is.
    Canonical(ContentReference),
    /// A channel name that always needs remote confirmation.
    ProvisionalChannel {
        /// What to look up.
        lookup: ChannelLookup,
        /// The URL the user supplied, if any.
        source_url: Option<String>,
    },
}
