//! Cooperative processing framework.
//!
//! Long computations run as one asynchronous task per request on a
//! single-threaded runtime. Each stage inserts suspension points every
//! [`YIELD_INTERVAL`] items through a [`ProcessingToken`], which also carries
//! cancellation, timeout and progress state. A [`ProcessingScheduler`] owns
//! the single current token and the most recent completed result, so a new
//! request supersedes the previous run and stale output is never committed.

pub mod debounce;
pub mod scheduler;
pub mod token;

pub use debounce::Debouncer;
pub use scheduler::{ProcessingScheduler, RunOutcome};
pub use token::{ProcessingToken, ProgressCallback, ProgressUpdate, YIELD_INTERVAL};
