//! Markdown rendering: YAML frontmatter followed by the note body.

use serde::Serialize;

use super::VideoRecord;
use super::filename::date_prefix;

const TRANSCRIPT_MISSING: &str = "*Transcript not available.*";
const KEY_POINTS_MISSING: &str = "*No key points extracted.*";

/// Frontmatter in its fixed key order. Empty optional values are omitted.
#[derive(Debug, Serialize)]
struct Frontmatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
    youtube_id: &'a str,
    channel: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<&'a str>,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "is_empty_list")]
    tags: &'a [String],
    #[serde(skip_serializing_if = "is_empty_list")]
    keywords: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    playlist_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_audio_language: Option<&'a str>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_empty_list(values: &&[String]) -> bool {
    values.is_empty()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Renders the complete note for `record`.
///
/// Output depends only on the record, so identical inputs give identical
/// files.
///
/// # Errors
///
/// Returns the YAML error if the frontmatter cannot be serialized.
pub fn render_note(record: &VideoRecord) -> Result<String, serde_yaml::Error> {
    let frontmatter = Frontmatter {
        title: &record.title,
        date: record.published_at.as_deref().and_then(date_prefix),
        youtube_id: &record.id,
        channel: &record.author,
        channel_id: non_empty(record.channel_id.as_deref()),
        url: record.watch_url(),
        description: non_empty(Some(record.description.as_str())),
        tags: &record.tags,
        keywords: &record.summary.keywords,
        playlist_id: non_empty(record.playlist_id.as_deref()),
        thumbnail: non_empty(record.thumbnail_url.as_deref()),
        category_id: non_empty(record.category_id.as_deref()),
        default_language: non_empty(record.default_language.as_deref()),
        default_audio_language: non_empty(record.default_audio_language.as_deref()),
    };
    let yaml = serde_yaml::to_string(&frontmatter)?;

    let mut note = String::with_capacity(yaml.len() + 1024);
    note.push_str("---\n");
    note.push_str(&yaml);
    if !yaml.ends_with('\n') {
        note.push('\n');
    }
    note.push_str("---\n\n");

    if let Some(thumbnail) = non_empty(record.thumbnail_url.as_deref()) {
        note.push_str(&format!("![{}]({thumbnail})\n\n", record.title.replace(['[', ']'], "")));
    }
    note.push_str(&format!("[Watch on YouTube]({})\n\n", record.watch_url()));

    note.push_str("## Summary\n\n");
    note.push_str(record.summary.summary.trim());
    note.push_str("\n\n## Key Points\n\n");
    if record.summary.key_points.is_empty() {
        note.push_str(KEY_POINTS_MISSING);
        note.push('\n');
    } else {
        for point in &record.summary.key_points {
            note.push_str(&format!("- {point}\n"));
        }
    }

    note.push_str("\n## Transcript\n\n");
    match non_empty(record.transcript.as_deref()) {
        Some(transcript) => note.push_str(transcript),
        None => note.push_str(TRANSCRIPT_MISSING),
    }
    note.push('\n');

    Ok(note)
}

/// Extracts the YAML block between the leading `---` fences.
#[must_use]
pub fn frontmatter_block(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&rest[..offset]);
        }
        offset += line.len();
    }
    None
}
