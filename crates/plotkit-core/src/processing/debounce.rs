//! Collapse bursts of recomputation requests into one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Fixed-delay debouncer.
///
/// Every call to [`Debouncer::settle`] takes a ticket and waits for the delay.
/// Only the caller holding the newest ticket when the delay elapses gets
/// `true`; all earlier callers get `false` and should drop their request.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay; returns whether this request is still the newest.
    pub async fn settle(&self) -> bool {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
