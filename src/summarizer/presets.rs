//! Per-model request presets.
//!
//! Small local models are slow and have short context windows, so each known
//! model carries its own request timeout and transcript length limit.

use std::time::Duration;

use tracing::{debug, warn};

/// Timeout and transcript limit for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPreset {
    /// Model identifier as sent to the endpoint.
    pub name: &'static str,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Transcript characters sent; the rest is cut.
    pub max_transcript_chars: usize,
}

const fn preset(name: &'static str, timeout_secs: u64, max_transcript_chars: usize) -> ModelPreset {
    ModelPreset {
        name,
        timeout: Duration::from_secs(timeout_secs),
        max_transcript_chars,
    }
}

/// Known models, in lookup order.
pub const MODEL_PRESETS: &[ModelPreset] = &[
    // Ollama
    preset("gemma:3b", 180, 20_000),
    preset("gemma:7b", 240, 15_000),
    preset("gemma3:1b", 180, 20_000),
    preset("gemma3:12b", 600, 8_000),
    preset("qwen3:30b-a3b", 480, 15_000),
    preset("llama3:8b", 240, 15_000),
    preset("llama3:70b", 600, 10_000),
    // OpenAI
    preset("gpt-3.5-turbo", 60, 25_000),
    preset("gpt-4", 120, 20_000),
    // Gemini
    preset("gemini-pro", 120, 20_000),
    preset("gemini-2.5-flash-preview", 120, 25_000),
];

/// Used for models not in [`MODEL_PRESETS`].
pub const DEFAULT_PRESET: ModelPreset = preset("default", 180, 15_000);

/// Finds the preset for `model`: exact match, then substring match in
/// either direction (case-insensitive), else [`DEFAULT_PRESET`].
#[must_use]
pub fn preset_for(model: &str) -> ModelPreset {
    if let Some(found) = MODEL_PRESETS.iter().find(|p| p.name == model) {
        return *found;
    }

    let wanted = model.trim().to_lowercase();
    if !wanted.is_empty() {
        let partial = MODEL_PRESETS
            .iter()
            .find(|p| p.name.contains(wanted.as_str()))
            .or_else(|| MODEL_PRESETS.iter().find(|p| wanted.contains(p.name)));
        if let Some(found) = partial {
            debug!(model, preset = found.name, "using partial preset match");
            return *found;
        }
    }

    warn!(model, "unknown model; using default preset");
    DEFAULT_PRESET
}

/// Cuts `transcript` to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_transcript(transcript: &str, max_chars: usize) -> String {
    match transcript.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            debug!(max_chars, original_chars = transcript.chars().count(), "truncating transcript");
            format!("{}\n[transcript truncated]", &transcript[..byte_index])
        }
        None => transcript.to_string(),
    }
}
