//! Scheduler owning the current processing token and the last completed result.

use super::token::{ProcessingToken, ProgressCallback};
use crate::error::ProcessingError;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How a scheduled run ended.
#[derive(Debug)]
pub enum RunOutcome<R> {
    /// The run finished while still current; its result is now the latest.
    Completed(Arc<R>),
    /// The run was cancelled or replaced by a newer one. Nothing was committed.
    Superseded,
    /// The run exceeded the configured budget. The previous result is kept.
    TimedOut {
        /// Elapsed time when the budget was exceeded.
        elapsed_ms: u64,
    },
    /// The run failed. The previous result is kept.
    Failed(ProcessingError),
}

impl<R> RunOutcome<R> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Message for the user, `None` for completed or superseded runs.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Completed(_) | Self::Superseded => None,
            Self::TimedOut { elapsed_ms } => {
                ProcessingError::Timeout {
                    elapsed_ms: *elapsed_ms,
                }
                .user_message()
            }
            Self::Failed(err) => err.user_message(),
        }
    }
}

/// Runs jobs one at a time from the caller's point of view.
///
/// Starting a run cancels the previous token. Results are committed only when
/// the run completes while its token is still valid, so observers never see a
/// mix of stale and fresh output.
pub struct ProcessingScheduler<R> {
    generation: Arc<AtomicU64>,
    current: Mutex<Option<ProcessingToken>>,
    latest: Mutex<Option<Arc<R>>>,
    timeout: Option<Duration>,
    observer: Option<ProgressCallback>,
}

impl<R> Default for ProcessingScheduler<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ProcessingScheduler<R> {
    /// Create a scheduler without a time budget.
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            current: Mutex::new(None),
            latest: Mutex::new(None),
            timeout: None,
            observer: None,
        }
    }

    /// Set the per-run wall-clock budget (`None` = unbounded).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Install an observer that receives progress reports of every run.
    pub fn with_progress_observer(mut self, observer: ProgressCallback) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Start a new run: cancels the previous token and installs a fresh one.
    pub fn begin(&self) -> ProcessingToken {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = ProcessingToken::new(
            id,
            self.generation.clone(),
            self.timeout,
            self.observer.clone(),
        );

        let previous = self.current.lock().replace(token.clone());
        if let Some(previous) = previous {
            tracing::debug!("Run {} superseded by run {}", previous.id(), id);
            previous.cancel();
        }

        token
    }

    /// Cancel the current run, if any.
    pub fn cancel_current(&self) {
        if let Some(token) = self.current.lock().take() {
            tracing::debug!("Run {} cancelled", token.id());
            token.cancel();
        }
    }

    /// Token of the run in flight, if any.
    pub fn current_token(&self) -> Option<ProcessingToken> {
        self.current.lock().clone()
    }

    /// The most recent completed result.
    pub fn latest(&self) -> Option<Arc<R>> {
        self.latest.lock().clone()
    }

    /// Run `job` under a fresh token and commit its result if it is still current.
    pub async fn run<F, Fut>(&self, job: F) -> RunOutcome<R>
    where
        F: FnOnce(ProcessingToken) -> Fut,
        Fut: Future<Output = Result<R, ProcessingError>>,
    {
        let token = self.begin();
        let result = job(token.clone()).await;
        self.finish(&token, result)
    }

    fn finish(
        &self,
        token: &ProcessingToken,
        result: Result<R, ProcessingError>,
    ) -> RunOutcome<R> {
        let outcome = match result {
            Ok(value) => {
                if token.is_valid() {
                    let value = Arc::new(value);
                    *self.latest.lock() = Some(value.clone());
                    tracing::info!(
                        "Run {} completed in {}ms",
                        token.id(),
                        token.elapsed().as_millis()
                    );
                    RunOutcome::Completed(value)
                } else {
                    tracing::debug!("Run {} finished after being superseded", token.id());
                    RunOutcome::Superseded
                }
            }
            Err(ProcessingError::Cancelled) => {
                tracing::debug!("Run {} cancelled", token.id());
                RunOutcome::Superseded
            }
            Err(ProcessingError::Timeout { elapsed_ms }) => {
                tracing::warn!("Run {} timed out after {}ms", token.id(), elapsed_ms);
                RunOutcome::TimedOut { elapsed_ms }
            }
            Err(err) => {
                match &err {
                    ProcessingError::Internal(reason) => {
                        tracing::error!("Run {} failed: {}", token.id(), reason)
                    }
                    other => tracing::info!("Run {} rejected: {}", token.id(), other),
                }
                RunOutcome::Failed(err)
            }
        };

        // Only a run that is still current clears the slot.
        let mut current = self.current.lock();
        if current.as_ref().map(|t| t.id()) == Some(token.id()) {
            *current = None;
        }

        outcome
    }
}
