//! Retry logic with deterministic exponential backoff for outbound calls.
//!
//! This module provides the [`RetryPolicy`] and [`FailureType`] types for
//! classifying request errors and the [`execute`] loop that applies them.
//!
//! # Overview
//!
//! When a request fails, the error is classified into a [`FailureType`]:
//! - [`FailureType::Transient`] - Temporary failures that may succeed on retry
//! - [`FailureType::RateLimited`] - Server rate limiting (retries with backoff)
//! - [`FailureType::Permanent`] - Malformed request or missing resource
//! - [`FailureType::NeedsAuth`] - Bad or missing credentials, exhausted quota
//!
//! Only the first two are retried. Everything else surfaces as
//! [`RetryError::Fatal`] without consuming another attempt.
//!
//! # Delay Calculation
//!
//! ```text
//! delay(1) = 0
//! delay(n) = min(initial_delay * exponential_base^(n-2), max_delay)   for n >= 2
//! ```
//!
//! There is no jitter: the same policy always yields the same schedule.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, instrument};

use super::error::{ApiError, is_content_restriction_reason};
use super::interrupt::Interrupt;

/// Default maximum attempts (one initial attempt plus three retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default delay before the first retry (1 second).
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Default maximum delay cap (60 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default backoff base (doubles each attempt).
const DEFAULT_EXPONENTIAL_BASE: f64 = 2.0;

/// Classification of request failure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Temporary failure that may succeed on retry.
    ///
    /// Examples: network timeout, 5xx server errors, connection refused.
    Transient,

    /// Permanent failure that won't succeed regardless of retries.
    ///
    /// Examples: 404 Not Found, 400 Bad Request, unparseable body.
    Permanent,

    /// Authentication or authorization failure.
    ///
    /// Examples: invalid API key, exhausted daily quota.
    NeedsAuth,

    /// Server rate limiting (HTTP 429 or an API-level rate limit reason).
    RateLimited,
}

impl FailureType {
    /// Returns true for failure types the executor retries.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimited)
    }
}

/// Errors that know how to classify themselves for retry decisions.
pub trait RetryClassify {
    /// Classifies this error.
    fn failure_type(&self) -> FailureType;
}

impl RetryClassify for ApiError {
    fn failure_type(&self) -> FailureType {
        classify_error(self)
    }
}

/// Decision on whether to retry a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Do not retry the request.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for retry behavior with exponential backoff.
///
/// # Default Values
///
/// - `max_attempts`: 4
/// - `initial_delay`: 1 second
/// - `max_delay`: 60 seconds
/// - `exponential_base`: 2.0
///
/// Immutable once built; shared read-only by every client.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay before the second attempt.
    initial_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied for each further attempt.
    exponential_base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            exponential_base: DEFAULT_EXPONENTIAL_BASE,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1 and `exponential_base` to at
    /// least 1.0 so the schedule can never shrink.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        exponential_base: f64,
    ) -> Self {
        let exponential_base = if exponential_base.is_finite() {
            exponential_base.max(1.0)
        } else {
            DEFAULT_EXPONENTIAL_BASE
        };
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
            exponential_base,
        }
    }

    /// Creates a policy with a custom `max_attempts`, using defaults for other settings.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the second attempt.
    #[must_use]
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Returns the delay cap.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Returns the exponential base.
    #[must_use]
    pub fn exponential_base(&self) -> f64 {
        self.exponential_base
    }

    /// Delay to wait before `attempt` (1-indexed). Attempt 1 never waits.
    #[must_use]
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let raw_secs = self.initial_delay.as_secs_f64() * self.exponential_base.powi(exponent);
        let capped_secs = raw_secs.min(self.max_delay.as_secs_f64());

        if capped_secs.is_finite() && capped_secs >= 0.0 {
            Duration::from_secs_f64(capped_secs)
        } else {
            self.max_delay
        }
    }

    /// Full delay schedule for attempts `1..=max_attempts`.
    #[must_use]
    pub fn delay_schedule(&self) -> Vec<Duration> {
        (1..=self.max_attempts)
            .map(|attempt| self.delay_before_attempt(attempt))
            .collect()
    }

    /// Determines whether to retry a failed request.
    ///
    /// # Arguments
    ///
    /// * `failure_type` - Classification of the failure
    /// * `attempt` - The attempt number that just failed (1-indexed)
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        match failure_type {
            FailureType::Permanent => {
                return RetryDecision::DoNotRetry {
                    reason: "permanent failure - retry would not help".to_string(),
                };
            }
            FailureType::NeedsAuth => {
                return RetryDecision::DoNotRetry {
                    reason: "authentication failure - retry would not help".to_string(),
                };
            }
            FailureType::Transient | FailureType::RateLimited => {}
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let next_attempt = attempt + 1;
        let delay = self.delay_before_attempt(next_attempt);

        debug!(
            attempt,
            next_attempt,
            delay_ms = delay.as_millis(),
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: next_attempt,
        }
    }
}

/// Outcome of one attempt inside a retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The operation returned a value.
    Succeeded,
    /// The operation failed with a retryable error.
    Transient(String),
    /// The operation failed with a non-retryable error.
    Fatal(String),
}

/// Ephemeral record of one attempt; lives only for one [`execute_traced`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    /// 1-indexed attempt number.
    pub attempt_number: u32,
    /// Backoff waited before this attempt.
    pub delay_used: Duration,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Failure of a retry-governed operation.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempt(s): {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last transient failure observed.
        #[source]
        last: E,
    },

    /// A non-retryable error; no further attempts were made.
    #[error("{source}")]
    Fatal {
        /// The attempt that failed.
        attempt: u32,
        /// The failure.
        #[source]
        source: E,
    },

    /// The run was interrupted before or while waiting for `attempt`.
    #[error("interrupted before attempt {attempt}")]
    Interrupted {
        /// The attempt that did not happen.
        attempt: u32,
    },
}

impl<E> RetryError<E> {
    /// Returns the underlying error, if one was observed.
    #[must_use]
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Fatal { source, .. } => Some(source),
            Self::Interrupted { .. } => None,
        }
    }

    /// Returns true for [`RetryError::Interrupted`].
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

/// Runs `operation` under `policy`, retrying transient failures.
///
/// `operation` receives the 1-indexed attempt number. Backoff sleeps race
/// against `interrupt`, so Ctrl-C ends the loop with
/// [`RetryError::Interrupted`] instead of waiting out the delay.
pub async fn execute<T, E, F, Fut>(
    policy: &RetryPolicy,
    interrupt: &Interrupt,
    operation_name: &str,
    operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClassify + Display,
{
    execute_traced(policy, interrupt, operation_name, operation)
        .await
        .0
}

/// Same as [`execute`] but also returns the per-attempt trace.
#[instrument(skip_all, fields(operation = operation_name, max_attempts = policy.max_attempts()))]
pub async fn execute_traced<T, E, F, Fut>(
    policy: &RetryPolicy,
    interrupt: &Interrupt,
    operation_name: &str,
    mut operation: F,
) -> (Result<T, RetryError<E>>, Vec<FetchAttempt>)
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClassify + Display,
{
    let mut trace = Vec::new();
    let mut attempt = 1u32;
    let mut delay_used = Duration::ZERO;

    loop {
        if interrupt.is_triggered() {
            return (Err(RetryError::Interrupted { attempt }), trace);
        }

        let error = match operation(attempt).await {
            Ok(value) => {
                trace.push(FetchAttempt {
                    attempt_number: attempt,
                    delay_used,
                    outcome: AttemptOutcome::Succeeded,
                });
                return (Ok(value), trace);
            }
            Err(error) => error,
        };

        let failure_type = error.failure_type();
        match policy.should_retry(failure_type, attempt) {
            RetryDecision::Retry {
                delay,
                attempt: next_attempt,
            } => {
                debug!(
                    operation = operation_name,
                    attempt = next_attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "retrying request"
                );
                trace.push(FetchAttempt {
                    attempt_number: attempt,
                    delay_used,
                    outcome: AttemptOutcome::Transient(error.to_string()),
                });
                if !sleep_unless_interrupted(delay, interrupt).await {
                    return (
                        Err(RetryError::Interrupted {
                            attempt: next_attempt,
                        }),
                        trace,
                    );
                }
                attempt = next_attempt;
                delay_used = delay;
            }
            RetryDecision::DoNotRetry { reason } => {
                debug!(operation = operation_name, attempt, %reason, error = %error, "not retrying request");
                if failure_type.is_retryable() {
                    trace.push(FetchAttempt {
                        attempt_number: attempt,
                        delay_used,
                        outcome: AttemptOutcome::Transient(error.to_string()),
                    });
                    return (
                        Err(RetryError::Exhausted {
                            attempts: attempt,
                            last: error,
                        }),
                        trace,
                    );
                }
                trace.push(FetchAttempt {
                    attempt_number: attempt,
                    delay_used,
                    outcome: AttemptOutcome::Fatal(error.to_string()),
                });
                return (
                    Err(RetryError::Fatal {
                        attempt,
                        source: error,
                    }),
                    trace,
                );
            }
        }
    }
}

/// Sleeps for `delay`; returns false if interrupted first.
async fn sleep_unless_interrupted(delay: Duration, interrupt: &Interrupt) -> bool {
    if delay.is_zero() {
        return !interrupt.is_triggered();
    }
    tokio::select! {
        () = tokio::time::sleep(delay) => true,
        () = interrupt.wait() => false,
    }
}

/// Classifies a request error into a failure type for retry decisions.
///
/// # HTTP Status Code Classification
///
/// | Status | Type | Rationale |
/// |--------|------|-----------|
/// | 400 | Permanent | Bad request - won't succeed on retry |
/// | 401 | NeedsAuth | Unauthorized - bad credentials |
/// | 403 | NeedsAuth | Key rejected / quota exhausted (RateLimited or Permanent by reason) |
/// | 404 | Permanent | Not found - resource doesn't exist |
/// | 408 | Transient | Request timeout - may succeed |
/// | 410 | Permanent | Gone - permanently removed |
/// | 429 | RateLimited | Rate limited - retry with backoff |
/// | 5xx | Transient | Server error - may be temporary |
///
/// # Non-HTTP Errors
///
/// | Error | Type | Rationale |
/// |-------|------|-----------|
/// | Timeout | Transient | Network may recover |
/// | Network (most) | Transient | Server may come back |
/// | Network (TLS) | Permanent | Certificate/config issue |
/// | Decode | Permanent | Same body would come back |
/// | InvalidUrl | Permanent | Won't succeed |
/// | ClientBuild | Permanent | Local configuration problem |
#[instrument]
pub fn classify_error(error: &ApiError) -> FailureType {
    match error {
        ApiError::HttpStatus { status, reason, .. } => {
            match (*status, reason.as_deref()) {
                (403, Some(reason)) if is_rate_limit_reason(reason) => FailureType::RateLimited,
                (403, Some(reason)) if is_content_restriction_reason(reason) => {
                    FailureType::Permanent
                }
                (status, _) => classify_http_status(status),
            }
        }

        ApiError::Timeout { .. } => FailureType::Transient,

        ApiError::Network { source, .. } => {
            if is_tls_error(source) {
                FailureType::Permanent
            } else {
                FailureType::Transient
            }
        }

        ApiError::Decode { .. } | ApiError::InvalidUrl { .. } | ApiError::ClientBuild { .. } => {
            FailureType::Permanent
        }
    }
}

/// Classifies an HTTP status code into a failure type.
///
/// Explicit match arms are used for each status code for documentation purposes,
/// even though some return the same value.
#[allow(clippy::match_same_arms)]
fn classify_http_status(status: u16) -> FailureType {
    match status {
        400 => FailureType::Permanent,   // Bad Request
        401 => FailureType::NeedsAuth,   // Unauthorized
        403 => FailureType::NeedsAuth,   // Forbidden
        404 => FailureType::Permanent,   // Not Found
        408 => FailureType::Transient,   // Request Timeout
        410 => FailureType::Permanent,   // Gone
        429 => FailureType::RateLimited, // Too Many Requests

        500 => FailureType::Transient, // Internal Server Error
        502 => FailureType::Transient, // Bad Gateway
        503 => FailureType::Transient, // Service Unavailable
        504 => FailureType::Transient, // Gateway Timeout

        status if (400..500).contains(&status) => FailureType::Permanent,
        status if (500..600).contains(&status) => FailureType::Transient,

        _ => FailureType::Permanent,
    }
}

/// YouTube reports per-user throttling as 403 with one of these reasons.
fn is_rate_limit_reason(reason: &str) -> bool {
    matches!(reason, "rateLimitExceeded" | "userRateLimitExceeded")
}

/// Checks if a reqwest error is a TLS/certificate error.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let error_string = error.to_string().to_lowercase();
    error_string.contains("certificate")
        || error_string.contains("tls")
        || error_string.contains("ssl")
        || error_string.contains("handshake")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fmt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug)]
    struct TestError(FailureType);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test error ({:?})", self.0)
        }
    }

    impl RetryClassify for TestError {
        fn failure_type(&self) -> FailureType {
            self.0
        }
    }

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO, 2.0)
    }

    // ==================== RetryPolicy Tests ====================

    #[test]
    fn test_retry_policy_default_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.initial_delay(), Duration::from_secs(1));
        assert_eq!(policy.max_delay(), Duration::from_secs(60));
        assert!((policy.exponential_base() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_policy_max_attempts_minimum_is_one() {
        assert_eq!(RetryPolicy::with_max_attempts(0).max_attempts(), 1);
        assert_eq!(
            RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 2.0).max_attempts(),
            1
        );
    }

    #[test]
    fn test_retry_policy_base_below_one_is_clamped() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(10), 0.5);
        assert!((policy.exponential_base() - 1.0).abs() < f64::EPSILON);
    }

    // ==================== Delay Calculation Tests ====================

    #[test]
    fn test_delay_schedule_doubles_from_one_second() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(60), 2.0);
        assert_eq!(
            policy.delay_schedule(),
            vec![
                Duration::ZERO,
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
            ]
        );
    }

    #[test]
    fn test_delay_respects_max_delay() {
        let policy = RetryPolicy::new(5, Duration::from_secs(10), Duration::from_secs(15), 3.0);
        assert_eq!(policy.delay_before_attempt(2), Duration::from_secs(10));
        // 10 * 3^1 = 30s, capped at 15s
        assert_eq!(policy.delay_before_attempt(3), Duration::from_secs(15));
        assert_eq!(policy.delay_before_attempt(5), Duration::from_secs(15));
    }

    #[test]
    fn test_delay_first_attempt_is_zero() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before_attempt(0), Duration::ZERO);
        assert_eq!(policy.delay_before_attempt(1), Duration::ZERO);
    }

    #[test]
    fn test_delay_is_monotonic_and_capped() {
        let policies = [
            RetryPolicy::new(12, Duration::from_millis(250), Duration::from_secs(7), 1.7),
            RetryPolicy::new(12, Duration::from_secs(2), Duration::from_secs(1), 2.0),
            RetryPolicy::new(12, Duration::from_secs(1), Duration::from_secs(60), 1.0),
        ];
        for policy in policies {
            let schedule = policy.delay_schedule();
            for pair in schedule.windows(2) {
                assert!(pair[0] <= pair[1], "schedule not monotonic: {schedule:?}");
            }
            assert!(schedule.iter().all(|d| *d <= policy.max_delay()));
        }
    }

    #[test]
    fn test_delay_huge_attempt_does_not_overflow() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1), Duration::from_secs(30), 10.0);
        assert_eq!(policy.delay_before_attempt(5_000), Duration::from_secs(30));
    }

    // ==================== Error Classification Tests ====================

    #[test]
    fn test_classify_http_400_permanent() {
        let error = ApiError::http_status("http://example.com", 400);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_http_401_needs_auth() {
        let error = ApiError::http_status("http://example.com", 401);
        assert_eq!(classify_error(&error), FailureType::NeedsAuth);
    }

    #[test]
    fn test_classify_http_403_needs_auth() {
        let error = ApiError::http_status_with_reason(
            "http://example.com",
            403,
            Some("quotaExceeded".to_string()),
        );
        assert_eq!(classify_error(&error), FailureType::NeedsAuth);
    }

    #[test]
    fn test_classify_http_403_rate_limit_reason_is_rate_limited() {
        for reason in ["rateLimitExceeded", "userRateLimitExceeded"] {
            let error =
                ApiError::http_status_with_reason("http://example.com", 403, Some(reason.into()));
            assert_eq!(classify_error(&error), FailureType::RateLimited, "{reason}");
        }
    }

    #[test]
    fn test_classify_http_403_private_resource_is_permanent() {
        for reason in ["playlistItemsNotAccessible", "forbidden", "channelClosed"] {
            let error =
                ApiError::http_status_with_reason("http://example.com", 403, Some(reason.into()));
            assert_eq!(classify_error(&error), FailureType::Permanent, "{reason}");
        }
    }

    #[test]
    fn test_classify_http_404_permanent() {
        let error = ApiError::http_status("http://example.com", 404);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_http_408_transient() {
        let error = ApiError::http_status("http://example.com", 408);
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_http_429_rate_limited() {
        let error = ApiError::http_status("http://example.com", 429);
        assert_eq!(classify_error(&error), FailureType::RateLimited);
    }

    #[test]
    fn test_classify_http_5xx_transient() {
        for status in [500, 502, 503, 504, 599] {
            let error = ApiError::http_status("http://example.com", status);
            assert_eq!(classify_error(&error), FailureType::Transient, "{status}");
        }
    }

    #[test]
    fn test_classify_timeout_transient() {
        let error = ApiError::timeout("http://example.com");
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_decode_and_invalid_url_permanent() {
        assert_eq!(
            classify_error(&ApiError::decode("http://example.com", "bad json")),
            FailureType::Permanent
        );
        assert_eq!(
            classify_error(&ApiError::invalid_url("not-a-url")),
            FailureType::Permanent
        );
    }

    // ==================== Should Retry Decision Tests ====================

    #[test]
    fn test_should_retry_permanent_does_not_retry() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(FailureType::Permanent, 1);
        assert!(matches!(decision, RetryDecision::DoNotRetry { ref reason } if reason.contains("permanent")));
    }

    #[test]
    fn test_should_retry_needs_auth_does_not_retry() {
        let policy = RetryPolicy::default();
        let decision = policy.should_retry(FailureType::NeedsAuth, 1);
        assert!(matches!(decision, RetryDecision::DoNotRetry { ref reason } if reason.contains("auth")));
    }

    #[test]
    fn test_should_retry_transient_uses_schedule() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), Duration::from_secs(60), 2.0);
        assert_eq!(
            policy.should_retry(FailureType::Transient, 1),
            RetryDecision::Retry {
                delay: Duration::from_secs(1),
                attempt: 2
            }
        );
        assert_eq!(
            policy.should_retry(FailureType::RateLimited, 3),
            RetryDecision::Retry {
                delay: Duration::from_secs(4),
                attempt: 4
            }
        );
    }

    #[test]
    fn test_should_retry_respects_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(3);
        assert!(matches!(
            policy.should_retry(FailureType::Transient, 2),
            RetryDecision::Retry { .. }
        ));
        let decision = policy.should_retry(FailureType::Transient, 3);
        assert!(matches!(decision, RetryDecision::DoNotRetry { ref reason } if reason.contains("exhausted")));
    }

    // ==================== Executor Tests ====================

    #[tokio::test]
    async fn test_execute_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, RetryError<TestError>> =
            execute(&instant_policy(3), &Interrupt::new(), "test", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(attempt * 10) }
            })
            .await;
        assert_eq!(result.unwrap(), 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_fatal_on_first_attempt_never_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryError<TestError>> =
            execute(&instant_policy(5), &Interrupt::new(), "test", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError(FailureType::NeedsAuth)) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        match result {
            Err(RetryError::Fatal { attempt, .. }) => assert_eq!(attempt, 1),
            other => panic!("expected Fatal, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_exhausts_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let (result, trace) = execute_traced(&instant_policy(3), &Interrupt::new(), "test", |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(TestError(FailureType::Transient)) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(trace.len(), 3);
        match result {
            Err(RetryError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last.0, FailureType::Transient);
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_trace_records_delays() {
        let policy = RetryPolicy::new(4, Duration::from_millis(5), Duration::from_millis(8), 2.0);
        let (result, trace) = execute_traced(&policy, &Interrupt::new(), "test", |attempt| async move {
            if attempt < 4 {
                Err(TestError(FailureType::RateLimited))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 4);
        let delays: Vec<Duration> = trace.iter().map(|a| a.delay_used).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(5),
                Duration::from_millis(8),
                Duration::from_millis(8),
            ]
        );
        assert_eq!(trace[3].outcome, AttemptOutcome::Succeeded);
    }

    #[tokio::test]
    async fn test_execute_interrupted_before_first_attempt() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        let calls = AtomicU32::new(0);
        let result: Result<(), RetryError<TestError>> =
            execute(&instant_policy(3), &interrupt, "test", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert!(result.unwrap_err().is_interrupted());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_execute_interrupt_cuts_backoff_sleep_short() {
        let policy = RetryPolicy::new(3, Duration::from_secs(60), Duration::from_secs(60), 2.0);
        let interrupt = Interrupt::new();
        let trigger = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.trigger();
        });

        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<(), RetryError<TestError>> = tokio::time::timeout(
            Duration::from_secs(5),
            execute(&policy, &interrupt, "test", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError(FailureType::Transient)) }
            }),
        )
        .await
        .unwrap();

        match result {
            Err(RetryError::Interrupted { attempt }) => assert_eq!(attempt, 2),
            other => panic!("expected Interrupted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_error_inner_and_display() {
        let exhausted: RetryError<TestError> = RetryError::Exhausted {
            attempts: 4,
            last: TestError(FailureType::Transient),
        };
        assert!(exhausted.to_string().contains("gave up after 4 attempt(s)"));
        assert!(exhausted.inner().is_some());

        let interrupted: RetryError<TestError> = RetryError::Interrupted { attempt: 2 };
        assert!(interrupted.inner().is_none());
        assert!(interrupted.is_interrupted());
    }
}
