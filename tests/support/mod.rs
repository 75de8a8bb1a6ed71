//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::time::Duration;

use yt_obsidian_core::RetryPolicy;

/// Retry policy with millisecond delays so retry tests stay fast.
#[must_use]
pub fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(
        max_attempts,
        Duration::from_millis(5),
        Duration::from_millis(20),
        2.0,
    )
}

/// Request timeout used by test clients.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);
