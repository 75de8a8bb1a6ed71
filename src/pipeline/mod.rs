//! Pipeline Controller: resolved reference in, notes out.
//!
//! Sequencing per video: metadata, transcript, summary, note. A playlist
//! expands to its videos; a channel expands to its playlists (up to
//! `max_depth`) and then their videos, all in the API's native order.
//!
//! Failures are contained per item: an unavailable or failing video is
//! recorded in the [`ProcessReport`] and its siblings continue. Only
//! [`RunError`] (authentication rejected, interrupt) stops the run.

mod error;

pub use error::{ItemError, RunError};

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::http::{ApiError, Interrupt, RetryError};
use crate::note::{NoteWriter, VideoRecord, WriteOutcome};
use crate::parser::{ContentKind, ContentReference};
use crate::summarizer::{Summarizer, Summary};
use crate::transcript::TranscriptSource;
use crate::youtube::{MetadataApi, VIDEO_BATCH_SIZE, VideoMetadata};

use error::triage;

/// Default channel name when the API omits one.
pub const DEFAULT_AUTHOR: &str = "Unknown Channel";

/// Per-run options from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Where notes are written.
    pub output_dir: PathBuf,
    /// Replace existing notes instead of skipping them.
    pub overwrite: bool,
    /// Playlists walked per channel; 0 = all.
    pub max_depth: usize,
    /// Videos taken from each playlist; 0 = all.
    pub limit: usize,
}

impl PipelineOptions {
    /// Options with defaults for everything but the output directory.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
            max_depth: 0,
            limit: 0,
        }
    }
}

/// Final state of one item.
#[derive(Debug)]
pub enum ItemOutcome {
    /// A new note was created.
    Written(PathBuf),
    /// An existing note was replaced.
    Replaced(PathBuf),
    /// A note already existed; nothing was fetched or written.
    Skipped(PathBuf),
    /// A child item the API would not serve; a warning, not a failure.
    Unavailable(ItemError),
    /// The item failed.
    Failed(ItemError),
}

impl From<WriteOutcome> for ItemOutcome {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Written(path) => Self::Written(path),
            WriteOutcome::Replaced(path) => Self::Replaced(path),
            WriteOutcome::Skipped(path) => Self::Skipped(path),
        }
    }
}

/// One line of the run report.
#[derive(Debug)]
pub struct ItemReport {
    /// What the item is.
    pub kind: ContentKind,
    /// Item ID.
    pub id: String,
    /// What happened to it.
    pub outcome: ItemOutcome,
}

/// Everything that happened while processing one reference.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Items in processing order.
    pub items: Vec<ItemReport>,
}

impl ProcessReport {
    fn push(&mut self, kind: ContentKind, id: impl Into<String>, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            kind,
            id: id.into(),
            outcome,
        });
    }

    /// Notes written or replaced.
    #[must_use]
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Written(_) | ItemOutcome::Replaced(_)))
    }

    /// Notes skipped because they already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped(_)))
    }

    /// Child items reported unavailable.
    #[must_use]
    pub fn unavailable(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Unavailable(_)))
    }

    /// Items that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    /// Items that ended with a note on disk (written, replaced or skipped).
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.written() + self.skipped()
    }

    fn count(&self, predicate: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(&item.outcome)).count()
    }
}

/// Sequences the fetch, summarize and write stages.
pub struct Pipeline {
    api: Arc<dyn MetadataApi>,
    transcripts: Arc<dyn TranscriptSource>,
    summarizer: Arc<dyn Summarizer>,
    default_author: String,
    interrupt: Interrupt,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("default_author", &self.default_author)
            .finish_non_exhaustive()
    }
}

/// Videos that share one playlist context.
struct Batch {
    ids: Vec<String>,
    playlist_id: Option<String>,
    sole_item: bool,
}

impl Pipeline {
    /// Wires the pipeline to its collaborators.
    #[must_use]
    pub fn new(
        api: Arc<dyn MetadataApi>,
        transcripts: Arc<dyn TranscriptSource>,
        summarizer: Arc<dyn Summarizer>,
        default_author: impl Into<String>,
        interrupt: Interrupt,
    ) -> Self {
        Self {
            api,
            transcripts,
            summarizer,
            default_author: default_author.into(),
            interrupt,
        }
    }

    /// Processes one resolved reference.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when the run must stop. Per-item failures are in
    /// the report instead.
    #[instrument(skip(self, options), fields(kind = %reference.kind(), id = reference.id()))]
    pub async fn process(
        &self,
        reference: &ContentReference,
        options: &PipelineOptions,
    ) -> Result<ProcessReport, RunError> {
        let writer = NoteWriter::new(&options.output_dir);
        let mut report = ProcessReport::default();
        let mut seen = HashSet::new();

        match reference.kind() {
            ContentKind::Video => {
                let batch = Batch {
                    ids: vec![reference.id().to_string()],
                    playlist_id: reference.secondary_playlist().map(str::to_string),
                    sole_item: true,
                };
                self.process_batch(batch, &writer, options, &mut seen, &mut report)
                    .await?;
            }
            ContentKind::Playlist => {
                self.process_playlist(reference.id(), true, &writer, options, &mut seen, &mut report)
                    .await?;
            }
            ContentKind::Channel => {
                self.process_channel(reference.id(), &writer, options, &mut seen, &mut report)
                    .await?;
            }
        }

        info!(
            written = report.written(),
            skipped = report.skipped(),
            unavailable = report.unavailable(),
            failed = report.failed(),
            "reference processed"
        );
        Ok(report)
    }

    async fn process_channel(
        &self,
        channel_id: &str,
        writer: &NoteWriter,
        options: &PipelineOptions,
        seen: &mut HashSet<String>,
        report: &mut ProcessReport,
    ) -> Result<(), RunError> {
        let mut playlists = match self.api.channel_playlists(channel_id).await {
            Ok(playlists) => playlists,
            Err(error) => {
                let error = triage("channel", error)?;
                let item_error = if error.inner().is_some_and(ApiError::is_unavailable) {
                    ItemError::unavailable("channel", channel_id, error.to_string())
                } else {
                    ItemError::Remote {
                        stage: "channel",
                        id: channel_id.to_string(),
                        source: error,
                    }
                };
                error!(%channel_id, error = %item_error, "cannot list channel playlists");
                report.push(ContentKind::Channel, channel_id, ItemOutcome::Failed(item_error));
                return Ok(());
            }
        };

        if playlists.is_empty() {
            warn!(%channel_id, "channel has no public playlists");
            return Ok(());
        }
        if options.max_depth > 0 && playlists.len() > options.max_depth {
            debug!(total = playlists.len(), max_depth = options.max_depth, "limiting playlists");
            playlists.truncate(options.max_depth);
        }

        for playlist in playlists {
            info!(
                playlist_id = %playlist.id,
                title = playlist.title.as_deref().unwrap_or(""),
                "processing channel playlist"
            );
            self.process_playlist(&playlist.id, false, writer, options, seen, report)
                .await?;
        }
        Ok(())
    }

    async fn process_playlist(
        &self,
        playlist_id: &str,
        sole_item: bool,
        writer: &NoteWriter,
        options: &PipelineOptions,
        seen: &mut HashSet<String>,
        report: &mut ProcessReport,
    ) -> Result<(), RunError> {
        let mut ids = match self.api.playlist_video_ids(playlist_id).await {
            Ok(ids) => ids,
            Err(error) => {
                let error = triage("playlist", error)?;
                let item_error = if error.inner().is_some_and(ApiError::is_unavailable) {
                    ItemError::unavailable("playlist", playlist_id, error.to_string())
                } else {
                    ItemError::Remote {
                        stage: "playlist",
                        id: playlist_id.to_string(),
                        source: error,
                    }
                };
                let outcome = if sole_item || !item_error.is_unavailable() {
                    error!(%playlist_id, error = %item_error, "cannot list playlist");
                    ItemOutcome::Failed(item_error)
                } else {
                    warn!(%playlist_id, error = %item_error, "skipping unavailable playlist");
                    ItemOutcome::Unavailable(item_error)
                };
                report.push(ContentKind::Playlist, playlist_id, outcome);
                return Ok(());
            }
        };

        if ids.is_empty() {
            warn!(%playlist_id, "playlist has no videos");
            return Ok(());
        }
        if options.limit > 0 && ids.len() > options.limit {
            debug!(total = ids.len(), limit = options.limit, "limiting playlist videos");
            ids.truncate(options.limit);
        }

        let batch = Batch {
            ids,
            playlist_id: Some(playlist_id.to_string()),
            sole_item: false,
        };
        self.process_batch(batch, writer, options, seen, report).await
    }

    /// Processes videos in chunks of [`VIDEO_BATCH_SIZE`], one metadata call
    /// per chunk.
    async fn process_batch(
        &self,
        batch: Batch,
        writer: &NoteWriter,
        options: &PipelineOptions,
        seen: &mut HashSet<String>,
        report: &mut ProcessReport,
    ) -> Result<(), RunError> {
        let ids: Vec<String> = batch
            .ids
            .into_iter()
            .filter(|id| {
                let fresh = seen.insert(id.clone());
                if !fresh {
                    debug!(video_id = %id, "already handled in this run");
                }
                fresh
            })
            .collect();

        for chunk in ids.chunks(VIDEO_BATCH_SIZE) {
            if self.interrupt.is_triggered() {
                return Err(RunError::Interrupted);
            }

            let mut pending = Vec::with_capacity(chunk.len());
            for id in chunk {
                if options.overwrite {
                    pending.push(id.clone());
                    continue;
                }
                match writer.existing_note(id) {
                    Ok(Some(path)) => {
                        info!(video_id = %id, path = %path.display(), "note exists; skipping");
                        report.push(ContentKind::Video, id, ItemOutcome::Skipped(path));
                    }
                    Ok(None) => pending.push(id.clone()),
                    Err(note_error) => {
                        error!(video_id = %id, error = %note_error, "cannot check existing notes");
                        report.push(ContentKind::Video, id, ItemOutcome::Failed(note_error.into()));
                    }
                }
            }
            if pending.is_empty() {
                continue;
            }

            let details = match self.api.video_details(&pending).await {
                Ok(details) => details,
                Err(error) => {
                    let error = triage("metadata", error)?;
                    error!(count = pending.len(), %error, "metadata request failed");
                    let reason = error.to_string();
                    for id in pending {
                        let item_error = ItemError::Batch {
                            stage: "metadata",
                            id: id.clone(),
                            reason: reason.clone(),
                        };
                        report.push(ContentKind::Video, id, ItemOutcome::Failed(item_error));
                    }
                    continue;
                }
            };

            let mut by_id: HashMap<String, VideoMetadata> = details
                .into_iter()
                .map(|metadata| (metadata.id.clone(), metadata))
                .collect();

            for id in pending {
                if self.interrupt.is_triggered() {
                    return Err(RunError::Interrupted);
                }
                let Some(metadata) = by_id.remove(&id) else {
                    let item_error =
                        ItemError::unavailable("video", &id, "not returned by the metadata API (deleted or private)");
                    let outcome = if batch.sole_item {
                        error!(video_id = %id, error = %item_error, "requested video unavailable");
                        ItemOutcome::Failed(item_error)
                    } else {
                        warn!(video_id = %id, error = %item_error, "skipping unavailable video");
                        ItemOutcome::Unavailable(item_error)
                    };
                    report.push(ContentKind::Video, id, outcome);
                    continue;
                };

                let outcome = match self
                    .process_video(metadata, batch.playlist_id.clone(), writer, options)
                    .await?
                {
                    Ok(written) => written.into(),
                    Err(item_error) => {
                        error!(video_id = %id, error = %item_error, "video failed");
                        ItemOutcome::Failed(item_error)
                    }
                };
                report.push(ContentKind::Video, id, outcome);
            }
        }
        Ok(())
    }

    /// Transcript, summary and note for one video. The outer result stops the
    /// run; the inner one fails only this video.
    #[instrument(skip_all, fields(video_id = %metadata.id))]
    async fn process_video(
        &self,
        metadata: VideoMetadata,
        playlist_id: Option<String>,
        writer: &NoteWriter,
        options: &PipelineOptions,
    ) -> Result<Result<WriteOutcome, ItemError>, RunError> {
        let video_id = metadata.id.clone();
        let Some(record) = VideoRecord::from_metadata(metadata, &self.default_author) else {
            return Ok(Err(ItemError::MissingField {
                video_id,
                field: "title",
            }));
        };
        info!(title = %record.title, "processing video");

        let transcript = match self.transcripts.transcript(&video_id).await {
            Ok(transcript) => transcript,
            Err(RetryError::Interrupted { .. }) => return Err(RunError::Interrupted),
            Err(error) => {
                warn!(%error, "transcript unavailable; continuing without it");
                None
            }
        };

        let summary = match transcript.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(text) => match self.summarizer.summarize(text).await {
                Ok(summary) => summary,
                Err(error) => {
                    let error = triage("summary", error)?;
                    return Ok(Err(ItemError::Remote {
                        stage: "summary",
                        id: video_id,
                        source: error,
                    }));
                }
            },
            None => {
                debug!("no transcript; using placeholder summary");
                Summary::placeholder()
            }
        };

        let record = record
            .with_playlist(playlist_id)
            .with_transcript(transcript)
            .with_summary(summary);
        Ok(writer.write(&record, options.overwrite).map_err(ItemError::from))
    }
}
