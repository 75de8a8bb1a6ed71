//! Note emission: one Markdown file per video.
//!
//! [`NoteWriter`] owns the output directory. It keeps an index of the notes
//! already present (keyed by the `youtube_id` frontmatter field) so a rerun
//! skips or replaces the existing note instead of writing a second copy.
//!
//! Writes are serialized through the index lock. A new note is created with
//! create-new semantics, so the existence check and the write are one step
//! and a file that is not this video's note is never touched. Replacing an
//! indexed note goes through a same-directory temp file renamed over it.

mod filename;
mod render;

pub use filename::{
    candidate_filenames, date_prefix, disambiguated_filename, note_filename, slugify,
};
pub use render::{frontmatter_block, render_note};

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::summarizer::Summary;
use crate::youtube::VideoMetadata;

/// Errors produced while writing notes.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Filesystem failure.
    #[error("cannot write note at {path}: {source}\n  Suggestion: Check that the output directory exists and is writable")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Frontmatter serialization failure.
    #[error("cannot serialize frontmatter for video {video_id}: {source}")]
    Serialize {
        /// Video whose note failed.
        video_id: String,
        /// YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Every candidate filename is held by some other file.
    #[error("no free filename for video {video_id} in {dir}\n  Suggestion: Rename or move the files named after this video's title")]
    NoFreeName {
        /// Video whose note could not be placed.
        video_id: String,
        /// Output directory.
        dir: PathBuf,
    },
}

impl NoteError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Everything a note is rendered from. Built across pipeline stages and
/// written once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    /// Canonical video ID.
    pub id: String,
    /// Video title; always non-empty.
    pub title: String,
    /// Channel display name, or the configured default author.
    pub author: String,
    /// Channel ID.
    pub channel_id: Option<String>,
    /// RFC 3339 publish timestamp.
    pub published_at: Option<String>,
    /// Video description.
    pub description: String,
    /// Uploader tags.
    pub tags: Vec<String>,
    /// Thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// Category ID.
    pub category_id: Option<String>,
    /// Metadata language.
    pub default_language: Option<String>,
    /// Audio language.
    pub default_audio_language: Option<String>,
    /// Playlist the video was reached through, if any.
    pub playlist_id: Option<String>,
    /// Formatted transcript, if one exists.
    pub transcript: Option<String>,
    /// AI summary, key points and keywords.
    pub summary: Summary,
}

impl VideoRecord {
    /// Starts a record from API metadata.
    ///
    /// Returns `None` when the ID or title is missing: such a video must not
    /// produce a note.
    #[must_use]
    pub fn from_metadata(metadata: VideoMetadata, default_author: &str) -> Option<Self> {
        let title = metadata.title.filter(|t| !t.trim().is_empty())?;
        if metadata.id.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: metadata.id,
            title,
            author: metadata
                .channel_title
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| default_author.to_string()),
            channel_id: metadata.channel_id,
            published_at: metadata.published_at,
            description: metadata.description,
            tags: metadata.tags,
            thumbnail_url: metadata.thumbnail_url,
            category_id: metadata.category_id,
            default_language: metadata.default_language,
            default_audio_language: metadata.default_audio_language,
            playlist_id: None,
            transcript: None,
            summary: Summary::default(),
        })
    }

    /// Records the playlist the video came from.
    #[must_use]
    pub fn with_playlist(mut self, playlist_id: Option<String>) -> Self {
        self.playlist_id = playlist_id;
        self
    }

    /// Attaches the transcript.
    #[must_use]
    pub fn with_transcript(mut self, transcript: Option<String>) -> Self {
        self.transcript = transcript;
        self
    }

    /// Attaches the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.summary = summary;
        self
    }

    /// Watch URL of the video.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

/// What happened to one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new note was created.
    Written(PathBuf),
    /// An existing note was replaced.
    Replaced(PathBuf),
    /// A note already existed and overwrite was off.
    Skipped(PathBuf),
}

impl WriteOutcome {
    /// Path of the note concerned.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::Replaced(path) | Self::Skipped(path) => path,
        }
    }
}

/// Writes notes into one output directory.
#[derive(Debug)]
pub struct NoteWriter {
    output_dir: PathBuf,
    index: Mutex<Option<HashMap<String, PathBuf>>>,
}

impl NoteWriter {
    /// Creates a writer for `output_dir`. Nothing is touched until the first
    /// lookup or write.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            index: Mutex::new(None),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the existing note for `video_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Io`] if the output directory cannot be listed.
    pub fn existing_note(&self, video_id: &str) -> Result<Option<PathBuf>, NoteError> {
        let mut guard = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let index = Self::loaded(&mut guard, &self.output_dir)?;
        Ok(index.get(video_id).cloned())
    }

    /// Writes the note for `record`.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError`] on serialization or filesystem failure.
    #[instrument(skip(self, record), fields(video_id = %record.id))]
    pub fn write(&self, record: &VideoRecord, overwrite: bool) -> Result<WriteOutcome, NoteError> {
        let content = render_note(record).map_err(|source| NoteError::Serialize {
            video_id: record.id.clone(),
            source,
        })?;

        let mut guard = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let index = Self::loaded(&mut guard, &self.output_dir)?;

        if let Some(existing) = index.get(&record.id).cloned() {
            if !overwrite {
                debug!(path = %existing.display(), "note exists; skipping");
                return Ok(WriteOutcome::Skipped(existing));
            }
            replace_file(&self.output_dir, &existing, &content)?;
            info!(path = %existing.display(), "note replaced");
            return Ok(WriteOutcome::Replaced(existing));
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| NoteError::io(&self.output_dir, e))?;
        let preferred = note_filename(&record.title, record.published_at.as_deref(), &record.id);
        let mut written = None;
        for name in candidate_filenames(&preferred, &record.id) {
            let path = self.output_dir.join(name);
            match create_new(&path, &content) {
                Ok(()) => {
                    written = Some(path);
                    break;
                }
                // Taken by a note for another video, or by an unrelated file.
                Err(NoteError::Io { source, .. }) if source.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "filename taken; trying next");
                }
                Err(error) => return Err(error),
            }
        }
        let Some(path) = written else {
            return Err(NoteError::NoFreeName {
                video_id: record.id.clone(),
                dir: self.output_dir.clone(),
            });
        };
        let outcome = WriteOutcome::Written(path.clone());

        index.insert(record.id.clone(), path);
        info!(path = %outcome.path().display(), "note written");
        Ok(outcome)
    }

    fn loaded<'a>(
        guard: &'a mut Option<HashMap<String, PathBuf>>,
        output_dir: &Path,
    ) -> Result<&'a mut HashMap<String, PathBuf>, NoteError> {
        if guard.is_none() {
            *guard = Some(scan_existing_notes(output_dir)?);
        }
        Ok(guard.get_or_insert_with(HashMap::new))
    }
}

fn create_new(path: &Path, content: &str) -> Result<(), NoteError> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| NoteError::io(path, e))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| NoteError::io(path, e))
}

fn replace_file(dir: &Path, path: &Path, content: &str) -> Result<(), NoteError> {
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| NoteError::io(dir, e))?;
    temp.write_all(content.as_bytes())
        .and_then(|()| temp.flush())
        .map_err(|e| NoteError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| NoteError::io(path, e.error))?;
    Ok(())
}

/// Maps `youtube_id` to note path for every `*.md` file in `dir`.
///
/// A missing directory is an empty index. Unreadable files and malformed
/// frontmatter are logged and skipped. When two notes claim the same video the
/// first in filename order wins.
///
/// # Errors
///
/// Returns [`NoteError::Io`] if `dir` exists but cannot be listed.
pub fn scan_existing_notes(dir: &Path) -> Result<HashMap<String, PathBuf>, NoteError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(error) => return Err(NoteError::io(dir, error)),
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut index = HashMap::new();
    for path in paths {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) => {
                warn!(path = %path.display(), %error, "cannot read note; ignoring");
                continue;
            }
        };
        let Some(block) = frontmatter_block(&content) else {
            continue;
        };
        match serde_yaml::from_str::<serde_yaml::Value>(block) {
            Ok(value) => {
                if let Some(id) = youtube_id(&value) {
                    index.entry(id).or_insert(path);
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "malformed frontmatter; ignoring");
            }
        }
    }
    debug!(dir = %dir.display(), notes = index.len(), "scanned existing notes");
    Ok(index)
}

fn youtube_id(frontmatter: &serde_yaml::Value) -> Option<String> {
    match frontmatter.get("youtube_id")? {
        serde_yaml::Value::String(id) => Some(id.trim().to_string()).filter(|id| !id.is_empty()),
        serde_yaml::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
