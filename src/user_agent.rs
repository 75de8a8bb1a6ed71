//! User-Agent string shared by every outbound client.

/// Project URL for User-Agent identification (RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/yt-obsidian";

/// Default User-Agent for metadata, transcript and AI requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("yt-obsidian/{version} (notes-tool; +{PROJECT_UA_URL})")
}
