//! Process-wide interrupt flag that also wakes sleeping waiters.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Cloneable interrupt handle.
///
/// The binary triggers it from the Ctrl-C handler; the retry loop races its
/// backoff sleep against [`Interrupt::wait`] so an abort is honored promptly
/// instead of after the full delay.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Interrupt {
    /// Creates an untriggered handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the run as interrupted and wakes every current waiter.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Returns true once [`Interrupt::trigger`] has been called.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves when the handle is triggered (immediately if it already was).
    pub async fn wait(&self) {
        loop {
            // Register before checking the flag so a trigger in between is not lost.
            let notified = self.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
