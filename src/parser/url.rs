//! Ordered recognizers for YouTube URL and bare-ID shapes.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use url::Url;

use super::reference::{ChannelLookup, ContentKind, ContentReference, PatternMatch};

/// Inputs longer than this are never YouTube identifiers.
pub const MAX_INPUT_LENGTH: usize = 2000;

fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^[A-Za-z0-9_-]{11}$"));

/// Bare playlist IDs: user playlists (`PL`), uploads (`UU`), favorites
/// (`FL`), liked (`LL`), mixes (`RD`) and `OL` album lists.
static BARE_PLAYLIST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^(?:PL|UU|FL|LL|RD|OL)[A-Za-z0-9_-]{10,}$"));

/// `list=` values inside URLs are accepted with any prefix.
static LIST_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^[A-Za-z0-9_-]{10,}$"));

static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^UC[A-Za-z0-9_-]{10,}$"));

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^@([A-Za-z0-9][A-Za-z0-9._-]{1,99})$"));

static CHANNEL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^[A-Za-z0-9][A-Za-z0-9._-]*$"));

/// Hostnames (after [`canonical_host`]) that serve YouTube content.
const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
    "youtube-nocookie.com",
];

/// Normalizes a host string: trim, lowercase, strip one leading "www." and
/// a trailing '.'.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Trims whitespace, strips surrounding quotes or angle brackets and adds
/// `https://` to scheme-less YouTube URLs (`youtu.be/abc…`).
#[must_use]
pub fn normalize_input(raw: &str) -> String {
    let mut value = raw.trim();
    loop {
        let stripped = strip_wrapping(value).trim();
        if stripped.len() == value.len() {
            break;
        }
        value = stripped;
    }

    let lower = value.to_ascii_lowercase();
    let scheme_less = YOUTUBE_HOSTS
        .iter()
        .any(|host| lower.starts_with(&format!("{host}/")) || lower.starts_with(&format!("www.{host}/")));
    if scheme_less {
        return format!("https://{value}");
    }
    value.to_string()
}

fn strip_wrapping(value: &str) -> &str {
    for (open, close) in [('"', '"'), ('\'', '\''), ('`', '`'), ('<', '>')] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    value
}

/// A parsed URL on one of the [`YOUTUBE_HOSTS`].
#[derive(Debug)]
struct YouTubeUrl {
    url: Url,
    host: String,
}

impl YouTubeUrl {
    fn parse(input: &str) -> Option<Self> {
        let url = Url::parse(input).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = canonical_host(url.host_str()?);
        YOUTUBE_HOSTS
            .contains(&host.as_str())
            .then_some(Self { url, host })
    }

    fn query(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn segment(&self, index: usize) -> Option<&str> {
        self.url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .nth(index)
    }

    fn is_host(&self, hosts: &[&str]) -> bool {
        hosts.contains(&self.host.as_str())
    }

    fn video_param(&self) -> Option<String> {
        self.query("v").filter(|id| is_video_id(id))
    }

    fn list_param(&self) -> Option<String> {
        self.query("list").filter(|id| LIST_PARAM_RE.is_match(id))
    }

    /// Video ID found at path segment `index` when segment 0 is one of `prefixes`.
    fn video_after(&self, prefixes: &[&str], index: usize) -> Option<String> {
        let first = self.segment(0)?;
        if !prefixes.iter().any(|p| first.eq_ignore_ascii_case(p)) {
            return None;
        }
        self.segment(index)
            .filter(|id| is_video_id(id))
            .map(str::to_string)
    }
}

/// One input under test: the normalized text and, if it is a YouTube URL,
/// its parsed form.
struct Candidate<'a> {
    text: &'a str,
    url: Option<YouTubeUrl>,
}

impl Candidate<'_> {
    fn source_url(&self) -> Option<String> {
        self.url.as_ref().map(|_| self.text.to_string())
    }

    fn video(&self, id: String, secondary: Option<String>) -> PatternMatch {
        PatternMatch::Canonical(
            ContentReference::video(id)
                .with_source_url(self.source_url())
                .with_secondary_playlist(secondary),
        )
    }

    fn canonical(&self, kind: ContentKind, id: impl Into<String>) -> PatternMatch {
        PatternMatch::Canonical(ContentReference::new(kind, id).with_source_url(self.source_url()))
    }

    fn provisional(&self, lookup: ChannelLookup) -> PatternMatch {
        PatternMatch::ProvisionalChannel {
            lookup,
            source_url: self.source_url(),
        }
    }
}

type Matcher = fn(&Candidate<'_>) -> Option<PatternMatch>;

/// A named recognizer for one input shape.
struct Recognizer {
    name: &'static str,
    matcher: Matcher,
}

/// Tried in order; the first hit wins. Video shapes come before playlist
/// shapes so `watch?v=..&list=..` resolves to the video.
const RECOGNIZERS: &[Recognizer] = &[
    Recognizer { name: "watch", matcher: match_watch },
    Recognizer { name: "short_link", matcher: match_short_link },
    Recognizer { name: "embed", matcher: match_embed },
    Recognizer { name: "shorts", matcher: match_shorts },
    Recognizer { name: "mobile", matcher: match_mobile },
    Recognizer { name: "legacy_v", matcher: match_legacy_v },
    Recognizer { name: "web_path", matcher: match_web_path },
    Recognizer { name: "bare_video_id", matcher: match_bare_video_id },
    Recognizer { name: "playlist_page", matcher: match_playlist_page },
    Recognizer { name: "embedded_playlist", matcher: match_embedded_playlist },
    Recognizer { name: "watch_list_only", matcher: match_watch_list_only },
    Recognizer { name: "bare_playlist_id", matcher: match_bare_playlist_id },
    Recognizer { name: "channel_id_url", matcher: match_channel_id_url },
    Recognizer { name: "custom_name_url", matcher: match_custom_name_url },
    Recognizer { name: "legacy_user_url", matcher: match_legacy_user_url },
    Recognizer { name: "handle_url", matcher: match_handle_url },
    Recognizer { name: "bare_handle", matcher: match_bare_handle },
    Recognizer { name: "bare_channel_id", matcher: match_bare_channel_id },
];

/// Runs the ordered recognizers over a normalized input.
///
/// Returns `None` when no shape matches; the caller then decides whether a
/// remote lookup is worth attempting.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn match_patterns(input: &str) -> Option<PatternMatch> {
    if input.is_empty() || input.len() > MAX_INPUT_LENGTH {
        return None;
    }

    let candidate = Candidate {
        text: input,
        url: YouTubeUrl::parse(input),
    };

    for recognizer in RECOGNIZERS {
        if let Some(found) = (recognizer.matcher)(&candidate) {
            debug!(recognizer = recognizer.name, "input matched");
            return Some(found);
        }
        trace!(recognizer = recognizer.name, "no match");
    }
    None
}

/// Returns true for an 11-character video ID.
#[must_use]
pub fn is_video_id(value: &str) -> bool {
    VIDEO_ID_RE.is_match(value)
}

/// Returns true when `input` parses as a URL on a YouTube host.
#[must_use]
pub fn is_youtube_url(input: &str) -> bool {
    YouTubeUrl::parse(input).is_some()
}

/// Best token to hand the remote lookup for an input no recognizer matched:
/// the `v`/`list` parameter or last path segment of a YouTube URL, else the
/// input itself. `None` means there is nothing worth looking up (foreign
/// URLs, text with whitespace).
#[must_use]
pub fn fallback_token(input: &str) -> Option<String> {
    if input.is_empty() || input.len() > MAX_INPUT_LENGTH || input.chars().any(char::is_whitespace) {
        return None;
    }
    if let Some(url) = YouTubeUrl::parse(input) {
        return url
            .query("v")
            .or_else(|| url.query("list"))
            .or_else(|| {
                url.url
                    .path_segments()
                    .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
                    .filter(|s| !matches!(*s, "watch" | "playlist" | "embed" | "shorts"))
                    .map(str::to_string)
            });
    }
    if Url::parse(input).is_ok_and(|url| url.has_host()) {
        return None;
    }
    Some(input.to_string())
}

// ==================== Video recognizers ====================

fn match_watch(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if !url.is_host(&["youtube.com", "music.youtube.com"]) || url.url.path() != "/watch" {
        return None;
    }
    let id = url.video_param()?;
    Some(candidate.video(id, url.list_param()))
}

fn match_short_link(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if !url.is_host(&["youtu.be"]) {
        return None;
    }
    let id = url.segment(0).filter(|id| is_video_id(id))?.to_string();
    Some(candidate.video(id, url.list_param()))
}

fn match_embed(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if !url.is_host(&["youtube.com", "youtube-nocookie.com"]) {
        return None;
    }
    let id = url
        .video_after(&["embed"], 1)
        .filter(|id| !EMBED_PSEUDO_IDS.contains(&id.as_str()))?;
    Some(candidate.video(id, url.list_param()))
}

/// Path words under `/embed/` that look like IDs but name a player mode.
const EMBED_PSEUDO_IDS: &[&str] = &["videoseries", "live_stream"];

fn match_shorts(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    let id = url.video_after(&["shorts"], 1)?;
    Some(candidate.video(id, None))
}

fn match_mobile(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if !url.is_host(&["m.youtube.com"]) || url.url.path() != "/watch" {
        return None;
    }
    let id = url.video_param()?;
    Some(candidate.video(id, url.list_param()))
}

fn match_legacy_v(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    let id = url.video_after(&["v", "e"], 1)?;
    Some(candidate.video(id, None))
}

/// `/web/<id>`, `/live/<id>` and `/watch/<id>` path forms.
fn match_web_path(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    let id = url.video_after(&["web", "live", "watch"], 1)?;
    Some(candidate.video(id, url.list_param()))
}

fn match_bare_video_id(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    if candidate.url.is_some() || !is_video_id(candidate.text) {
        return None;
    }
    Some(candidate.video(candidate.text.to_string(), None))
}

// ==================== Playlist recognizers ====================

fn match_playlist_page(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if url.segment(0) != Some("playlist") {
        return None;
    }
    let id = url.list_param()?;
    Some(candidate.canonical(ContentKind::Playlist, id))
}

/// `/embed/videoseries?list=<id>`, the embedded playlist player.
fn match_embedded_playlist(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if !url.is_host(&["youtube.com", "youtube-nocookie.com"])
        || url.segment(0) != Some("embed")
        || url.segment(1) != Some("videoseries")
    {
        return None;
    }
    let id = url.list_param()?;
    Some(candidate.canonical(ContentKind::Playlist, id))
}

fn match_watch_list_only(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if url.url.path() != "/watch" || url.video_param().is_some() {
        return None;
    }
    let id = url.list_param()?;
    Some(candidate.canonical(ContentKind::Playlist, id))
}

fn match_bare_playlist_id(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    if candidate.url.is_some() || !BARE_PLAYLIST_ID_RE.is_match(candidate.text) {
        return None;
    }
    Some(candidate.canonical(ContentKind::Playlist, candidate.text))
}

// ==================== Channel recognizers ====================

fn match_channel_id_url(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if url.segment(0) != Some("channel") {
        return None;
    }
    let id = url.segment(1).filter(|id| CHANNEL_ID_RE.is_match(id))?;
    Some(candidate.canonical(ContentKind::Channel, id))
}

fn match_custom_name_url(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if url.segment(0) != Some("c") {
        return None;
    }
    let name = url.segment(1).filter(|name| CHANNEL_NAME_RE.is_match(name))?;
    Some(candidate.provisional(ChannelLookup::CustomName(name.to_string())))
}

fn match_legacy_user_url(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    if url.segment(0) != Some("user") {
        return None;
    }
    let name = url.segment(1).filter(|name| CHANNEL_NAME_RE.is_match(name))?;
    Some(candidate.provisional(ChannelLookup::LegacyUser(name.to_string())))
}

fn match_handle_url(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    let url = candidate.url.as_ref()?;
    let first = url.segment(0)?;
    // Handles may arrive percent-encoded (`%40name`).
    let decoded = first.replace("%40", "@");
    let handle = HANDLE_RE.captures(&decoded)?.get(1)?.as_str().to_string();
    Some(candidate.provisional(ChannelLookup::Handle(handle)))
}

fn match_bare_handle(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    if candidate.url.is_some() {
        return None;
    }
    let handle = HANDLE_RE.captures(candidate.text)?.get(1)?.as_str().to_string();
    Some(candidate.provisional(ChannelLookup::Handle(handle)))
}

fn match_bare_channel_id(candidate: &Candidate<'_>) -> Option<PatternMatch> {
    if candidate.url.is_some() || !CHANNEL_ID_RE.is_match(candidate.text) {
        return None;
    }
    Some(candidate.canonical(ContentKind::Channel, candidate.text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VIDEO_ID: &str = "dQw4w9WgXcQ";
    const PLAYLIST_ID: &str = "PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf";
    const CHANNEL_ID: &str = "UCuAXFkgsw1L7xaCfnd5JJOw";

    fn canonical(input: &str) -> ContentReference {
        match match_patterns(&normalize_input(input)) {
            Some(PatternMatch::Canonical(reference)) => reference,
            other => panic!("expected canonical match for {input}, got {other:?}"),
        }
    }

    fn provisional(input: &str) -> ChannelLookup {
        match match_patterns(&normalize_input(input)) {
            Some(PatternMatch::ProvisionalChannel { lookup, .. }) => lookup,
            other => panic!("expected provisional channel for {input}, got {other:?}"),
        }
    }

    // ==================== Normalization ====================

    #[test]
    fn test_normalize_trims_and_strips_quotes() {
        assert_eq!(normalize_input("  \"dQw4w9WgXcQ\"  "), VIDEO_ID);
        assert_eq!(normalize_input("'  dQw4w9WgXcQ '"), VIDEO_ID);
        assert_eq!(
            normalize_input("<https://youtu.be/dQw4w9WgXcQ>"),
            "https://youtu.be/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_normalize_adds_scheme_to_youtube_hosts() {
        assert_eq!(
            normalize_input("youtu.be/dQw4w9WgXcQ?si=abc"),
            "https://youtu.be/dQw4w9WgXcQ?si=abc"
        );
        assert_eq!(
            normalize_input("www.youtube.com/watch?v=dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(normalize_input("example.com/watch"), "example.com/watch");
    }

    #[test]
    fn test_canonical_host_strips_www() {
        assert_eq!(canonical_host("WWW.YouTube.com."), "youtube.com");
        assert_eq!(canonical_host("m.youtube.com"), "m.youtube.com");
        assert_eq!(canonical_host("www.www.youtube.com"), "www.youtube.com");
    }

    // ==================== Video shapes ====================

    #[test]
    fn test_every_video_shape_resolves_to_same_id() {
        let inputs = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42&si=tracking",
            "youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=10",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://www.youtube.com/web/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
            "dQw4w9WgXcQ",
        ];
        for input in inputs {
            let reference = canonical(input);
            assert_eq!(reference.kind(), ContentKind::Video, "{input}");
            assert_eq!(reference.id(), VIDEO_ID, "{input}");
        }
    }

    #[test]
    fn test_watch_with_list_prefers_video_and_keeps_playlist() {
        let reference =
            canonical(&format!("https://www.youtube.com/watch?v={VIDEO_ID}&list={PLAYLIST_ID}&index=3"));
        assert_eq!(reference.kind(), ContentKind::Video);
        assert_eq!(reference.id(), VIDEO_ID);
        assert_eq!(reference.secondary_playlist(), Some(PLAYLIST_ID));
    }

    #[test]
    fn test_bare_id_has_no_source_url() {
        assert_eq!(canonical(VIDEO_ID).source_url(), None);
        assert_eq!(
            canonical("https://youtu.be/dQw4w9WgXcQ").source_url(),
            Some("https://youtu.be/dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_watch_with_bad_video_id_does_not_match_video() {
        assert_eq!(match_patterns("https://www.youtube.com/watch?v="), None);
        assert_eq!(match_patterns("https://www.youtube.com/watch?v=short"), None);
    }

    // ==================== Playlist shapes ====================

    #[test]
    fn test_playlist_page_url() {
        let reference = canonical(&format!("https://www.youtube.com/playlist?list={PLAYLIST_ID}"));
        assert_eq!(reference.kind(), ContentKind::Playlist);
        assert_eq!(reference.id(), PLAYLIST_ID);
    }

    #[test]
    fn test_embedded_playlist_player_is_playlist() {
        for host in ["www.youtube.com", "www.youtube-nocookie.com"] {
            let reference =
                canonical(&format!("https://{host}/embed/videoseries?list={PLAYLIST_ID}"));
            assert_eq!(reference.kind(), ContentKind::Playlist, "{host}");
            assert_eq!(reference.id(), PLAYLIST_ID);
            assert_eq!(reference.secondary_playlist(), None);
        }
        assert_eq!(match_patterns("https://www.youtube.com/embed/videoseries"), None);
        assert_eq!(match_patterns("https://www.youtube.com/embed/live_stream?channel=x"), None);
    }

    #[test]
    fn test_watch_url_with_only_list_is_playlist() {
        let reference = canonical(&format!("https://www.youtube.com/watch?list={PLAYLIST_ID}"));
        assert_eq!(reference.kind(), ContentKind::Playlist);
    }

    #[test]
    fn test_bare_playlist_ids() {
        for id in [PLAYLIST_ID, "UUXXXXXXXXXXXXXXXX", "FLXXXXXXXXXXXXXXXX"] {
            let reference = canonical(id);
            assert_eq!(reference.kind(), ContentKind::Playlist, "{id}");
            assert_eq!(reference.id(), id);
        }
    }

    #[test]
    fn test_too_short_prefixes_do_not_match() {
        assert_eq!(match_patterns("PL"), None);
        assert_eq!(match_patterns("UC"), None);
    }

    // ==================== Channel shapes ====================

    #[test]
    fn test_channel_id_url_and_bare_id() {
        let from_url = canonical(&format!("https://www.youtube.com/channel/{CHANNEL_ID}/videos"));
        assert_eq!(from_url.kind(), ContentKind::Channel);
        assert_eq!(from_url.id(), CHANNEL_ID);

        let bare = canonical(CHANNEL_ID);
        assert_eq!(bare.kind(), ContentKind::Channel);
    }

    #[test]
    fn test_handles_are_provisional() {
        assert_eq!(
            provisional("https://www.youtube.com/@veritasium"),
            ChannelLookup::Handle("veritasium".into())
        );
        assert_eq!(
            provisional("https://www.youtube.com/@veritasium/videos"),
            ChannelLookup::Handle("veritasium".into())
        );
        assert_eq!(provisional("@veritasium"), ChannelLookup::Handle("veritasium".into()));
    }

    #[test]
    fn test_custom_and_legacy_names_are_provisional() {
        assert_eq!(
            provisional("https://www.youtube.com/c/Vsauce"),
            ChannelLookup::CustomName("Vsauce".into())
        );
        assert_eq!(
            provisional("https://www.youtube.com/user/vsauce1"),
            ChannelLookup::LegacyUser("vsauce1".into())
        );
    }

    // ==================== Non-matches ====================

    #[test]
    fn test_unrecognized_inputs() {
        for input in ["invalid string", "https://example.com", "just/some/path", ""] {
            assert_eq!(match_patterns(&normalize_input(input)), None, "{input}");
        }
    }

    #[test]
    fn test_non_youtube_host_with_watch_path_is_ignored() {
        assert_eq!(match_patterns("https://example.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_overlong_input_is_rejected() {
        let long = "a".repeat(MAX_INPUT_LENGTH + 1);
        assert_eq!(match_patterns(&long), None);
        assert_eq!(fallback_token(&long), None);
    }

    // ==================== Fallback tokens ====================

    #[test]
    fn test_fallback_token_for_plain_text() {
        assert_eq!(fallback_token("SomeChannel").as_deref(), Some("SomeChannel"));
        assert_eq!(fallback_token("some channel"), None);
    }

    #[test]
    fn test_fallback_token_for_youtube_url_uses_last_segment() {
        assert_eq!(
            fallback_token("https://www.youtube.com/SomeName").as_deref(),
            Some("SomeName")
        );
        assert_eq!(fallback_token("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_fallback_token_for_foreign_url_is_none() {
        assert_eq!(fallback_token("https://example.com/video"), None);
    }
}
