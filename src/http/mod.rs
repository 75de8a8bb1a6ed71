//! Shared HTTP plumbing for every outbound call.
//!
//! All three external collaborators (metadata API, transcript host, AI
//! endpoint) go through the same pieces:
//!
//! - [`build_http_client`] - one `reqwest::Client` policy (timeouts, UA, gzip)
//! - [`ApiError`] - structured failure of a single request
//! - [`classify_error`] - maps an [`ApiError`] to a [`FailureType`]
//! - [`RetryPolicy`] / [`execute`] - deterministic exponential backoff loop
//! - [`Interrupt`] - lets Ctrl-C cut a backoff sleep short
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use yt_obsidian_core::http::RetryPolicy;
//!
//! let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(60), 2.0);
//! assert_eq!(policy.delay_before_attempt(1), Duration::ZERO);
//! assert_eq!(policy.delay_before_attempt(3), Duration::from_secs(2));
//! ```

mod client;
mod error;
mod interrupt;
mod retry;

pub use client::{build_http_client, send_json, send_text};
pub use error::ApiError;
pub use interrupt::Interrupt;
pub use retry::{
    AttemptOutcome, DEFAULT_MAX_ATTEMPTS, FailureType, FetchAttempt, RetryClassify,
    RetryDecision, RetryError, RetryPolicy, classify_error, execute, execute_traced,
};

// Note: no module-local Result alias. Spell out `Result<T, RetryError<ApiError>>`.
