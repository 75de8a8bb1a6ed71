//! YouTube to Obsidian core library
//!
//! Turns YouTube videos, playlists and channels into Markdown notes with an
//! AI-generated summary, key points and keywords.
//!
//! # Architecture
//!
//! - [`parser`] - recognizes the YouTube URL and ID shapes
//! - [`resolver`] - turns raw input into a [`ContentReference`], confirming
//!   handles and unmatched tokens against the metadata API
//! - [`http`] - shared HTTP client, error classification and the
//!   retry-governed executor
//! - [`youtube`] / [`transcript`] - metadata and caption clients
//! - [`summarizer`] - OpenAI-compatible summarization
//! - [`note`] - Markdown rendering and note files
//! - [`pipeline`] - sequences the stages per video and expands collections
//! - [`config`] / [`services`] - validated configuration and wiring

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod http;
pub mod note;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod services;
pub mod summarizer;
pub mod transcript;
mod user_agent;
pub mod youtube;

// Re-export commonly used types
pub use config::AppConfig;
pub use http::{ApiError, FailureType, Interrupt, RetryError, RetryPolicy, classify_error};
pub use note::{NoteWriter, VideoRecord, WriteOutcome};
pub use parser::{ContentKind, ContentReference};
pub use pipeline::{ItemOutcome, Pipeline, PipelineOptions, ProcessReport, RunError};
pub use resolver::{IdentifierResolver, ResolveError};
pub use services::Services;
