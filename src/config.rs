//! Validated runtime configuration.
//!
//! [`AppConfig`] is read once at start-up from environment variables (after
//! the binary has loaded an optional `.env` file) and passed by reference to
//! [`crate::services::Services::build`]. Nothing below this point reads the
//! environment.
//!
//! | Key | Default |
//! |-----|---------|
//! | `YOUTUBE_API_KEY` | required |
//! | `YOUTUBE_API_BASE_URL` | `https://www.googleapis.com/youtube/v3` |
//! | `TRANSCRIPT_BASE_URL` | `https://www.youtube.com` |
//! | `TRANSCRIPT_LANGUAGE` | `en` |
//! | `OBSIDIAN_VAULT_PATH` | `.` |
//! | `API_ENDPOINT` | `http://localhost:11434/v1` |
//! | `API_KEY` | none |
//! | `MODEL` | `gemma:3b` |
//! | `MAX_RETRIES` | `3` |
//! | `INITIAL_RETRY_DELAY` | `1.0` |
//! | `MAX_RETRY_DELAY` | `60.0` |
//! | `RETRY_EXPONENTIAL_BASE` | `2.0` |
//! | `MAX_KEYWORDS` | `10` |
//! | `REQUEST_TIMEOUT` | `30` |
//! | `DEFAULT_AUTHOR` | `Unknown Channel` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::http::RetryPolicy;
use crate::pipeline::DEFAULT_AUTHOR;
use crate::{transcript, youtube};

const DEFAULT_AI_ENDPOINT: &str = "http://localhost:11434/v1";
const DEFAULT_MODEL: &str = "gemma:3b";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_RETRY_DELAY: f64 = 1.0;
const DEFAULT_MAX_RETRY_DELAY: f64 = 60.0;
const DEFAULT_EXPONENTIAL_BASE: f64 = 2.0;
const DEFAULT_MAX_KEYWORDS: usize = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES_LIMIT: u32 = 20;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 3600;
const MAX_RETRY_DELAY_SECS: f64 = 86_400.0;

/// Retry settings as configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Seconds before the first retry.
    pub initial_delay_secs: f64,
    /// Upper bound for any delay, seconds.
    pub max_delay_secs: f64,
    /// Growth factor per retry.
    pub exponential_base: f64,
}

/// Everything the services need, validated.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    /// Metadata API key.
    pub youtube_api_key: String,
    /// Metadata API base URL.
    pub youtube_api_base_url: String,
    /// Timed-text host.
    pub transcript_base_url: String,
    /// Preferred caption language.
    pub transcript_language: String,
    /// Default output directory.
    pub vault_path: PathBuf,
    /// OpenAI-compatible endpoint.
    pub ai_endpoint: String,
    /// Bearer token for the AI endpoint.
    pub ai_api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Retry behaviour for every outbound call.
    pub retry: RetrySettings,
    /// Keyword cap.
    pub max_keywords: usize,
    /// Metadata and transcript request timeout.
    pub request_timeout: Duration,
    /// Channel name used when the API omits one.
    pub default_author: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("youtube_api_base_url", &self.youtube_api_base_url)
            .field("transcript_base_url", &self.transcript_base_url)
            .field("transcript_language", &self.transcript_language)
            .field("vault_path", &self.vault_path)
            .field("ai_endpoint", &self.ai_endpoint)
            .field("has_ai_api_key", &self.ai_api_key.is_some())
            .field("model", &self.model)
            .field("retry", &self.retry)
            .field("max_keywords", &self.max_keywords)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a required key is missing or a value does not validate.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    ///
    /// # Errors
    ///
    /// Fails when a required key is missing or a value does not validate.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let Some(youtube_api_key) = get("YOUTUBE_API_KEY") else {
            bail!(
                "Missing config value YOUTUBE_API_KEY\n  \
                 Suggestion: Create a YouTube Data API v3 key and export YOUTUBE_API_KEY or add it to .env"
            );
        };

        let youtube_api_base_url = url_value(
            "YOUTUBE_API_BASE_URL",
            get("YOUTUBE_API_BASE_URL"),
            youtube::DEFAULT_BASE_URL,
        )?;
        let transcript_base_url = url_value(
            "TRANSCRIPT_BASE_URL",
            get("TRANSCRIPT_BASE_URL"),
            transcript::DEFAULT_BASE_URL,
        )?;
        let ai_endpoint = url_value("API_ENDPOINT", get("API_ENDPOINT"), DEFAULT_AI_ENDPOINT)?;

        let max_retries: u32 = parsed(
            "MAX_RETRIES",
            get("MAX_RETRIES"),
            DEFAULT_MAX_RETRIES,
            "a non-negative integer",
        )?;
        if max_retries > MAX_RETRIES_LIMIT {
            bail!(
                "Invalid config value for MAX_RETRIES: {max_retries}. Expected an integer from 0 to {MAX_RETRIES_LIMIT}"
            );
        }
        let initial_delay_secs = non_negative_seconds(
            "INITIAL_RETRY_DELAY",
            get("INITIAL_RETRY_DELAY"),
            DEFAULT_INITIAL_RETRY_DELAY,
        )?;
        let max_delay_secs =
            non_negative_seconds("MAX_RETRY_DELAY", get("MAX_RETRY_DELAY"), DEFAULT_MAX_RETRY_DELAY)?;
        if max_delay_secs < initial_delay_secs {
            bail!(
                "Invalid config value for MAX_RETRY_DELAY: {max_delay_secs}. Expected a value >= INITIAL_RETRY_DELAY ({initial_delay_secs})"
            );
        }
        let exponential_base: f64 = parsed(
            "RETRY_EXPONENTIAL_BASE",
            get("RETRY_EXPONENTIAL_BASE"),
            DEFAULT_EXPONENTIAL_BASE,
            "a number",
        )?;
        if !exponential_base.is_finite() || exponential_base < 1.0 {
            bail!(
                "Invalid config value for RETRY_EXPONENTIAL_BASE: {exponential_base}. Expected a number >= 1"
            );
        }

        let max_keywords: usize = parsed(
            "MAX_KEYWORDS",
            get("MAX_KEYWORDS"),
            DEFAULT_MAX_KEYWORDS,
            "a positive integer",
        )?;
        if max_keywords == 0 {
            bail!("Invalid config value for MAX_KEYWORDS: 0. Expected a positive integer");
        }

        let timeout_secs: u64 = parsed(
            "REQUEST_TIMEOUT",
            get("REQUEST_TIMEOUT"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
            "a whole number of seconds",
        )?;
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&timeout_secs) {
            bail!(
                "Invalid config value for REQUEST_TIMEOUT: {timeout_secs}. Expected seconds from 1 to {MAX_REQUEST_TIMEOUT_SECS}"
            );
        }

        Ok(Self {
            youtube_api_key,
            youtube_api_base_url,
            transcript_base_url,
            transcript_language: get("TRANSCRIPT_LANGUAGE")
                .unwrap_or_else(|| transcript::DEFAULT_LANGUAGE.to_string()),
            vault_path: get("OBSIDIAN_VAULT_PATH").map_or_else(|| PathBuf::from("."), PathBuf::from),
            ai_endpoint,
            ai_api_key: get("API_KEY"),
            model: get("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            retry: RetrySettings {
                max_retries,
                initial_delay_secs,
                max_delay_secs,
                exponential_base,
            },
            max_keywords,
            request_timeout: Duration::from_secs(timeout_secs),
            default_author: get("DEFAULT_AUTHOR").unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        })
    }

    /// The retry policy every client shares: `MAX_RETRIES + 1` attempts.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries.saturating_add(1),
            Duration::from_secs_f64(self.retry.initial_delay_secs),
            Duration::from_secs_f64(self.retry.max_delay_secs),
            self.retry.exponential_base,
        )
    }
}

fn parsed<T: FromStr>(key: &str, value: Option<String>, default: T, expected: &str) -> Result<T> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<T>() {
            Ok(parsed) => Ok(parsed),
            Err(_) => bail!("Invalid config value for {key}: '{raw}'. Expected {expected}"),
        },
    }
}

fn non_negative_seconds(key: &str, value: Option<String>, default: f64) -> Result<f64> {
    let seconds: f64 = parsed(key, value, default, "a number of seconds")?;
    if !seconds.is_finite() || !(0.0..=MAX_RETRY_DELAY_SECS).contains(&seconds) {
        bail!(
            "Invalid config value for {key}: {seconds}. Expected seconds from 0 to {MAX_RETRY_DELAY_SECS}"
        );
    }
    Ok(seconds)
}

fn url_value(key: &str, value: Option<String>, default: &str) -> Result<String> {
    let raw = value.unwrap_or_else(|| default.to_string());
    match url::Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            Ok(raw.trim_end_matches('/').to_string())
        }
        _ => bail!("Invalid config value for {key}: '{raw}'. Expected an http(s) URL"),
    }
}
