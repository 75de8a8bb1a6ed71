//! Transcript summarization through an OpenAI-compatible chat endpoint.
//!
//! The pipeline only sees the [`Summarizer`] trait. [`OpenAiCompatibleClient`]
//! is the production implementation: it works against Ollama, `OpenAI` and any
//! other server that speaks `POST /v1/chat/completions`.
//!
//! Model output is parsed tolerantly by [`parse_summary`], since local models
//! rarely follow a response format exactly.

mod parse;
mod presets;

pub use parse::{clean_keywords, parse_summary};
pub use presets::{DEFAULT_PRESET, MODEL_PRESETS, ModelPreset, preset_for, truncate_transcript};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::http::{
    ApiError, Interrupt, RetryError, RetryPolicy, build_http_client, execute, send_json,
};

const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You summarize YouTube video transcripts for a personal knowledge base. \
Respond with a single JSON object and nothing else, using exactly these keys: \
\"summary\" (two or three paragraphs of plain prose), \
\"key_points\" (an array of short strings) and \
\"keywords\" (an array of short lowercase topic keywords).";

/// Parsed model output for one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Prose summary.
    pub summary: String,
    /// Bullet-point takeaways, in model order.
    pub key_points: Vec<String>,
    /// Topic keywords, cleaned and capped.
    pub keywords: Vec<String>,
}

impl Summary {
    /// Stand-in used when there is no transcript to summarize.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            summary: "No transcript was available, so no summary was generated.".to_string(),
            key_points: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

/// Turns transcript text into a [`Summary`].
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes `transcript`.
    async fn summarize(&self, transcript: &str) -> Result<Summary, RetryError<ApiError>>;
}

/// Chat-completions client with per-model presets.
pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    preset: ModelPreset,
    max_keywords: usize,
    policy: RetryPolicy,
    interrupt: Interrupt,
}

impl OpenAiCompatibleClient {
    /// Creates a client for `model` at `endpoint`.
    ///
    /// The request timeout comes from the model's preset.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when `endpoint` is not a URL, or
    /// [`ApiError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        model: impl Into<String>,
        max_keywords: usize,
        policy: RetryPolicy,
        interrupt: Interrupt,
    ) -> Result<Self, ApiError> {
        let endpoint = chat_completions_endpoint(endpoint);
        if url::Url::parse(&endpoint).is_err() {
            return Err(ApiError::invalid_url(endpoint));
        }
        let model = model.into();
        let preset = preset_for(&model);
        debug!(
            %model,
            preset = preset.name,
            timeout_secs = preset.timeout.as_secs(),
            "summarizer preset selected"
        );

        Ok(Self {
            client: build_http_client(preset.timeout)?,
            endpoint,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model,
            preset,
            max_keywords: max_keywords.max(1),
            policy,
            interrupt,
        })
    }

    /// Full chat-completions URL requests go to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Preset in effect for the configured model.
    #[must_use]
    pub fn preset(&self) -> ModelPreset {
        self.preset
    }
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

/// Appends the chat-completions path unless `base` already carries it.
#[must_use]
pub fn chat_completions_endpoint(base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Summarizer for OpenAiCompatibleClient {
    #[instrument(skip(self, transcript), fields(model = %self.model, chars = transcript.len()))]
    async fn summarize(&self, transcript: &str) -> Result<Summary, RetryError<ApiError>> {
        if transcript.trim().is_empty() {
            debug!("empty transcript; skipping model call");
            return Ok(Summary::placeholder());
        }

        let prompt_text = truncate_transcript(transcript, self.preset.max_transcript_chars);
        let user_prompt = format!("Transcript:\n\n{prompt_text}");
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            stream: false,
        };

        let response: ChatResponse = execute(&self.policy, &self.interrupt, "chat completion", |_| {
            let mut request = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }
            send_json(request, &self.endpoint)
        })
        .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RetryError::Fatal {
                attempt: 1,
                source: ApiError::decode(&self.endpoint, "response has no message content"),
            })?;

        let summary = parse_summary(&content, self.max_keywords);
        info!(
            key_points = summary.key_points.len(),
            keywords = summary.keywords.len(),
            "summary generated"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_completions_endpoint_variants() {
        assert_eq!(
            chat_completions_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_endpoint("http://localhost:11434/"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            chat_completions_endpoint("https://api.openai.com/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let result = OpenAiCompatibleClient::new(
            "not a url",
            None,
            "gemma:3b",
            10,
            RetryPolicy::default(),
            Interrupt::new(),
        );
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[test]
    fn test_new_uses_model_preset_and_hides_key() {
        let client = OpenAiCompatibleClient::new(
            "http://localhost:11434/v1",
            Some("secret-token".into()),
            "gemma3:12b",
            10,
            RetryPolicy::default(),
            Interrupt::new(),
        )
        .unwrap();
        assert_eq!(client.preset().max_transcript_chars, 8_000);
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-token"), "{debug}");
        assert!(debug.contains("has_api_key: true"), "{debug}");
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let client = OpenAiCompatibleClient::new(
            "http://localhost:11434/v1",
            Some("  ".into()),
            "gemma:3b",
            10,
            RetryPolicy::default(),
            Interrupt::new(),
        )
        .unwrap();
        assert!(format!("{client:?}").contains("has_api_key: false"));
    }

    #[tokio::test]
    async fn test_empty_transcript_gives_placeholder_without_request() {
        // Port 9 is discard; a request would fail, so success proves no call.
        let client = OpenAiCompatibleClient::new(
            "http://127.0.0.1:9/v1",
            None,
            "gemma:3b",
            10,
            RetryPolicy::with_max_attempts(1),
            Interrupt::new(),
        )
        .unwrap();
        let summary = client.summarize("   ").await.unwrap();
        assert_eq!(summary, Summary::placeholder());
    }
}
