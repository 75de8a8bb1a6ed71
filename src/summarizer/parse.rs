//! Tolerant parsing of free-text model output into a [`Summary`].
//!
//! Providers and local models rarely agree on formatting. Parsing tries, in
//! order: a JSON object (bare or fenced), markdown-ish heading sections, and
//! finally the whole text as the summary.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::Summary;

fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static THINK_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<think>.*?</think>"));

static FENCED_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```"));

static NUMBERED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^\d{1,3}[.)]\s+"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    KeyPoints,
    Keywords,
}

const SECTION_NAMES: &[(&str, Section)] = &[
    ("summary", Section::Summary),
    ("overview", Section::Summary),
    ("key points", Section::KeyPoints),
    ("key takeaways", Section::KeyPoints),
    ("takeaways", Section::KeyPoints),
    ("main points", Section::KeyPoints),
    ("keywords", Section::Keywords),
    ("key words", Section::Keywords),
    ("tags", Section::Keywords),
];

/// Parses raw model output, keeping at most `max_keywords` keywords.
#[must_use]
pub fn parse_summary(raw: &str, max_keywords: usize) -> Summary {
    let text = strip_think_blocks(raw);
    let text = text.trim();

    if let Some(summary) = parse_json(text, max_keywords) {
        return summary;
    }
    if let Some(summary) = parse_sections(text, max_keywords) {
        return summary;
    }
    Summary {
        summary: text.to_string(),
        key_points: Vec::new(),
        keywords: Vec::new(),
    }
}

/// Removes `<think>…</think>` reasoning blocks, plus anything before a
/// dangling `</think>`.
fn strip_think_blocks(raw: &str) -> String {
    let without_blocks = THINK_BLOCK_RE.replace_all(raw, "");
    match without_blocks.rfind("</think>") {
        Some(index) => without_blocks[index + "</think>".len()..].to_string(),
        None => without_blocks.into_owned(),
    }
}

// ==================== JSON ====================

fn parse_json(text: &str, max_keywords: usize) -> Option<Summary> {
    let candidate = FENCED_JSON_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            let start = text.find('{')?;
            let end = text.rfind('}')?;
            (end > start).then(|| text[start..=end].to_string())
        })?;

    let value: Value = serde_json::from_str(&candidate).ok()?;
    let object = value.as_object()?;

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let key_points: Vec<String> = ["key_points", "keyPoints", "key_takeaways", "takeaways"]
        .iter()
        .find_map(|key| object.get(*key))
        .map(json_list)
        .unwrap_or_default()
        .iter()
        .map(|point| strip_list_marker(point).to_string())
        .filter(|point| !point.is_empty())
        .collect();
    let keywords = ["keywords", "tags"]
        .iter()
        .find_map(|key| object.get(*key))
        .map(json_list)
        .map(|raw| {
            let split: Vec<String> = raw
                .iter()
                .flat_map(|entry| entry.split(','))
                .map(str::to_string)
                .collect();
            clean_keywords(split.iter().map(String::as_str), max_keywords)
        })
        .unwrap_or_default();

    if summary.is_empty() && key_points.is_empty() {
        return None;
    }
    Some(Summary {
        summary,
        key_points,
        keywords,
    })
}

/// Array of strings, or one string split into lines.
fn json_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Value::String(text) => text.lines().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

// ==================== Heading sections ====================

fn parse_sections(text: &str, max_keywords: usize) -> Option<Summary> {
    let mut current: Option<Section> = None;
    let mut found_heading = false;
    let mut summary_lines: Vec<String> = Vec::new();
    let mut key_points: Vec<String> = Vec::new();
    let mut keyword_entries: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some((section, inline)) = heading(line) {
            found_heading = true;
            current = Some(section);
            if !inline.is_empty() {
                push_line(section, &inline, &mut summary_lines, &mut key_points, &mut keyword_entries);
            }
            continue;
        }
        if let Some(section) = current {
            push_line(section, line, &mut summary_lines, &mut key_points, &mut keyword_entries);
        }
    }

    if !found_heading {
        return None;
    }

    let summary = summary_lines.join("\n").trim().to_string();
    let keywords = clean_keywords(keyword_entries.iter().map(String::as_str), max_keywords);
    if summary.is_empty() && key_points.is_empty() && keywords.is_empty() {
        return None;
    }
    Some(Summary {
        summary,
        key_points,
        keywords,
    })
}

fn push_line(
    section: Section,
    line: &str,
    summary_lines: &mut Vec<String>,
    key_points: &mut Vec<String>,
    keyword_entries: &mut Vec<String>,
) {
    match section {
        Section::Summary => summary_lines.push(line.trim_end().to_string()),
        Section::KeyPoints => {
            let point = strip_list_marker(line);
            if !point.is_empty() {
                key_points.push(point.to_string());
            }
        }
        Section::Keywords => {
            keyword_entries.extend(line.split(',').map(str::to_string));
        }
    }
}

/// Recognizes `# Summary`, `**Key Points:**`, `Keywords: a, b` and similar.
/// Returns the section and any inline text after the colon.
fn heading(line: &str) -> Option<(Section, String)> {
    let trimmed = line.trim();
    let had_hashes = trimmed.starts_with('#');
    let cleaned = trimmed
        .trim_start_matches('#')
        .trim()
        .replace("**", "")
        .replace("__", "");
    let cleaned = cleaned.trim();

    for (name, section) in SECTION_NAMES {
        let Some(prefix) = cleaned.get(..name.len()) else {
            continue;
        };
        if !prefix.eq_ignore_ascii_case(name) {
            continue;
        }
        let rest = &cleaned[name.len()..];
        if rest.is_empty() || (had_hashes && rest.trim_end_matches(':').is_empty()) {
            return Some((*section, String::new()));
        }
        if let Some(after_colon) = rest.strip_prefix(':') {
            return Some((*section, after_colon.trim().to_string()));
        }
    }
    None
}

/// Strips `- `, `* `, `• `, `+ ` and `1.` / `1)` list markers.
fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim();
    for marker in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return rest.trim();
        }
    }
    if let Some(found) = NUMBERED_MARKER_RE.find(trimmed) {
        return trimmed[found.end()..].trim();
    }
    trimmed
}

/// Cleans, de-duplicates (case-insensitively) and caps keywords.
#[must_use]
pub fn clean_keywords<'a>(entries: impl Iterator<Item = &'a str>, max_keywords: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .map(|entry| {
            strip_list_marker(entry)
                .trim_start_matches('#')
                .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '*' | '.' | ' '))
                .to_string()
        })
        .filter(|keyword| !keyword.is_empty())
        .filter(|keyword| seen.insert(keyword.to_lowercase()))
        .take(max_keywords)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== JSON ====================

    #[test]
    fn test_parse_bare_json() {
        let raw = r#"{"summary":"A talk about Rust.","key_points":["Ownership","- Borrowing"],"keywords":["rust","Rust","memory safety"]}"#;
        let summary = parse_summary(raw, 10);
        assert_eq!(summary.summary, "A talk about Rust.");
        assert_eq!(summary.key_points, vec!["Ownership", "Borrowing"]);
        assert_eq!(summary.keywords, vec!["rust", "memory safety"]);
    }

    #[test]
    fn test_parse_fenced_json_with_camel_case_and_comma_keywords() {
        let raw = "Here you go:\n```json\n{\"summary\": \"S\", \"keyPoints\": [\"P\"], \"keywords\": \"a, b, c\"}\n```\nThanks";
        let summary = parse_summary(raw, 2);
        assert_eq!(summary.summary, "S");
        assert_eq!(summary.key_points, vec!["P"]);
        assert_eq!(summary.keywords, vec!["a", "b"]);
    }

    #[test]
    fn test_json_without_summary_or_points_falls_through() {
        let raw = r#"{"foo": "bar"}"#;
        let summary = parse_summary(raw, 5);
        assert_eq!(summary.summary, raw);
        assert!(summary.key_points.is_empty());
    }

    // ==================== Sections ====================

    #[test]
    fn test_parse_markdown_sections() {
        let raw = "## Summary\nThe video explains lifetimes.\nIt is short.\n\n## Key Points\n- Lifetimes are regions\n2. Elision rules\n\n## Keywords\n- #rust\n- lifetimes, borrowing\n";
        let summary = parse_summary(raw, 10);
        assert_eq!(summary.summary, "The video explains lifetimes.\nIt is short.");
        assert_eq!(summary.key_points, vec!["Lifetimes are regions", "Elision rules"]);
        assert_eq!(summary.keywords, vec!["rust", "lifetimes", "borrowing"]);
    }

    #[test]
    fn test_parse_bold_headings_with_inline_values() {
        let raw = "**Summary:** One line summary.\n**Key Takeaways:**\n* First\n**Tags:** alpha, beta";
        let summary = parse_summary(raw, 10);
        assert_eq!(summary.summary, "One line summary.");
        assert_eq!(summary.key_points, vec!["First"]);
        assert_eq!(summary.keywords, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_sentence_starting_with_summary_word_is_not_heading() {
        assert!(heading("Summary of events follows").is_none());
        assert!(heading("# Summary").is_some());
        assert!(heading("### Key Points:").is_some());
    }

    // ==================== Fallback ====================

    #[test]
    fn test_plain_text_becomes_summary() {
        let summary = parse_summary("  Just a paragraph.  ", 10);
        assert_eq!(summary.summary, "Just a paragraph.");
        assert!(summary.keywords.is_empty());
    }

    #[test]
    fn test_think_blocks_are_removed() {
        let raw = "<think>\nLet me reason about this...\n</think>\n## Summary\nFinal answer.";
        assert_eq!(parse_summary(raw, 10).summary, "Final answer.");

        let dangling = "reasoning without opener</think>Answer.";
        assert_eq!(parse_summary(dangling, 10).summary, "Answer.");
    }

    // ==================== Keywords ====================

    #[test]
    fn test_clean_keywords_strips_markers_and_dedupes() {
        let entries = ["1. Rust", "- \"rust\"", "#async", "  ", "`tokio`", "Async"];
        let keywords = clean_keywords(entries.into_iter(), 10);
        assert_eq!(keywords, vec!["Rust", "async", "tokio"]);
    }

    #[test]
    fn test_clean_keywords_caps_count() {
        let entries = ["a", "b", "c", "d"];
        assert_eq!(clean_keywords(entries.into_iter(), 3), vec!["a", "b", "c"]);
    }
}
