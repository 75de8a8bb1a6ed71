//! Note filenames: `YYYY-MM-DD-<slug>.md`.

const MAX_SLUG_CHARS: usize = 80;

/// Lowercase ASCII alphanumeric runs joined by `-`.
///
/// Non-ASCII letters are dropped rather than transliterated.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.len() > MAX_SLUG_CHARS {
        slug.truncate(MAX_SLUG_CHARS);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// The `YYYY-MM-DD` prefix of an RFC 3339 timestamp, if it has one.
#[must_use]
pub fn date_prefix(published_at: &str) -> Option<&str> {
    let candidate = published_at.trim().get(..10)?;
    let bytes = candidate.as_bytes();
    let shaped = bytes.iter().enumerate().all(|(index, byte)| match index {
        4 | 7 => *byte == b'-',
        _ => byte.is_ascii_digit(),
    });
    shaped.then_some(candidate)
}

/// Preferred filename for a note.
#[must_use]
pub fn note_filename(title: &str, published_at: Option<&str>, video_id: &str) -> String {
    let slug = slugify(title);
    let stem = if slug.is_empty() {
        video_id.to_string()
    } else {
        slug
    };
    match published_at.and_then(date_prefix) {
        Some(date) => format!("{date}-{stem}.md"),
        None => format!("{stem}.md"),
    }
}

/// Filename used when the preferred one belongs to another video.
#[must_use]
pub fn disambiguated_filename(preferred: &str, video_id: &str) -> String {
    let stem = preferred.strip_suffix(".md").unwrap_or(preferred);
    format!("{stem}-{video_id}.md")
}

/// Upper bound on numbered variants tried after the disambiguated name.
pub const MAX_NAME_VARIANTS: usize = 99;

/// Filenames to try in order: preferred, `-<id>`, then `-<id>-2` onwards.
pub fn candidate_filenames(preferred: &str, video_id: &str) -> impl Iterator<Item = String> {
    let stem = preferred.strip_suffix(".md").unwrap_or(preferred).to_string();
    let numbered = (2..=MAX_NAME_VARIANTS + 1).map(move |n| format!("{stem}-{video_id}-{n}.md"));
    [preferred.to_string(), disambiguated_filename(preferred, video_id)]
        .into_iter()
        .chain(numbered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Rust in 100 Seconds!"), "rust-in-100-seconds");
        assert_eq!(slugify("  --Hello,   World--  "), "hello-world");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Übersicht 日本"), "caf-bersicht");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_slugify_truncates_without_trailing_dash() {
        let title = "word ".repeat(40);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_CHARS);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn test_date_prefix() {
        assert_eq!(date_prefix("2024-01-15T10:00:00Z"), Some("2024-01-15"));
        assert_eq!(date_prefix("2024-01-15"), Some("2024-01-15"));
        assert_eq!(date_prefix("yesterday"), None);
        assert_eq!(date_prefix("2024/01/15T00"), None);
    }

    #[test]
    fn test_note_filename_variants() {
        assert_eq!(
            note_filename("My Video", Some("2023-05-01T00:00:00Z"), "abcdefghijk"),
            "2023-05-01-my-video.md"
        );
        assert_eq!(note_filename("My Video", None, "abcdefghijk"), "my-video.md");
        assert_eq!(note_filename("日本語", None, "abcdefghijk"), "abcdefghijk.md");
    }

    #[test]
    fn test_candidate_filenames_order() {
        let names: Vec<String> = candidate_filenames("2023-05-01-my-video.md", "abcdefghijk")
            .take(3)
            .collect();
        assert_eq!(
            names,
            vec![
                "2023-05-01-my-video.md",
                "2023-05-01-my-video-abcdefghijk.md",
                "2023-05-01-my-video-abcdefghijk-2.md",
            ]
        );
        assert_eq!(
            candidate_filenames("x.md", "id").count(),
            MAX_NAME_VARIANTS + 2
        );
    }

    #[test]
    fn test_disambiguated_filename() {
        assert_eq!(
            disambiguated_filename("2023-05-01-my-video.md", "abcdefghijk"),
            "2023-05-01-my-video-abcdefghijk.md"
        );
    }
}
