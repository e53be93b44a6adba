//! Cancellation and progress context for a single pipeline run.

use crate::error::{ProcessingError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of processed items between suspension points.
pub const YIELD_INTERVAL: usize = 64;

/// Callback receiving every progress report of a run.
pub type ProgressCallback = Arc<dyn Fn(&ProgressUpdate) + Send + Sync>;

/// Snapshot of a run's progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressUpdate {
    /// Identifier of the token that reported it.
    pub token_id: u64,
    /// Overall completion, 0..=100.
    pub percent: f32,
    /// Human-readable stage description.
    pub message: String,
}

struct TokenState {
    id: u64,
    /// Generation cell shared with the owning scheduler; `id` must match it.
    current: Arc<AtomicU64>,
    cancelled: AtomicBool,
    started: Instant,
    last_yield: Mutex<Instant>,
    progress: Mutex<ProgressUpdate>,
    timeout: Option<Duration>,
    observer: Option<ProgressCallback>,
}

/// Handle to one in-flight run.
///
/// Cloning is cheap; all clones observe the same state. A token is valid while
/// it has not been cancelled and is still the scheduler's current token.
#[derive(Clone)]
pub struct ProcessingToken {
    state: Arc<TokenState>,
}

impl std::fmt::Debug for ProcessingToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingToken")
            .field("id", &self.state.id)
            .field("cancelled", &self.is_cancelled())
            .field("current", &self.is_current())
            .field("elapsed", &self.elapsed())
            .finish()
    }
}

impl ProcessingToken {
    pub(crate) fn new(
        id: u64,
        current: Arc<AtomicU64>,
        timeout: Option<Duration>,
        observer: Option<ProgressCallback>,
    ) -> Self {
        let now = Instant::now();
        Self {
            state: Arc::new(TokenState {
                id,
                current,
                cancelled: AtomicBool::new(false),
                started: now,
                last_yield: Mutex::new(now),
                progress: Mutex::new(ProgressUpdate {
                    token_id: id,
                    percent: 0.0,
                    message: String::new(),
                }),
                timeout,
                observer,
            }),
        }
    }

    /// A token not managed by any scheduler, for running stages directly.
    pub fn detached(timeout: Option<Duration>) -> Self {
        Self::new(0, Arc::new(AtomicU64::new(0)), timeout, None)
    }

    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// Flag this run as cancelled. Idempotent.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// True while this token is the scheduler's current one.
    pub fn is_current(&self) -> bool {
        self.state.current.load(Ordering::SeqCst) == self.state.id
    }

    /// True while the run may still commit output.
    pub fn is_valid(&self) -> bool {
        !self.is_cancelled() && self.is_current()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.started.elapsed()
    }

    /// Time since the last suspension point.
    pub fn since_last_yield(&self) -> Duration {
        self.state.last_yield.lock().elapsed()
    }

    /// Raise `Cancelled` or `Timeout` if the run may not continue.
    pub fn check(&self) -> Result<()> {
        if !self.is_valid() {
            return Err(ProcessingError::Cancelled);
        }
        if let Some(limit) = self.state.timeout {
            let elapsed = self.elapsed();
            if elapsed > limit {
                return Err(ProcessingError::Timeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                });
            }
        }
        Ok(())
    }

    /// Suspend to the runtime, then re-validate.
    pub async fn yield_now(&self) -> Result<()> {
        self.check()?;
        tokio::task::yield_now().await;
        *self.state.last_yield.lock() = Instant::now();
        self.check()
    }

    /// Suspension point for inner loops: yields once every [`YIELD_INTERVAL`] items.
    pub async fn checkpoint(&self, processed: usize) -> Result<()> {
        if processed > 0 && processed % YIELD_INTERVAL == 0 {
            self.yield_now().await
        } else {
            Ok(())
        }
    }

    /// Record progress and notify the observer, if any.
    pub fn report_progress(&self, percent: f32, message: impl Into<String>) {
        let update = {
            let mut progress = self.state.progress.lock();
            progress.percent = percent.clamp(0.0, 100.0);
            progress.message = message.into();
            progress.clone()
        };
        if let Some(observer) = &self.state.observer {
            observer(&update);
        }
    }

    pub fn progress(&self) -> ProgressUpdate {
        self.state.progress.lock().clone()
    }
}
