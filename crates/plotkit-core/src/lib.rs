//! # PlotKit Core
//!
//! Core types and utilities shared by the PlotKit crates.
//! Provides the geometry data model that flows through the toolpath
//! pipeline, the error taxonomy, measurement units, and the cooperative
//! processing framework (tokens, scheduler, debouncing) that lets long
//! computations yield, report progress and be superseded.

pub mod error;
pub mod processing;
pub mod types;
pub mod units;

pub use error::{ProcessingError, Result};

pub use processing::{
    Debouncer, ProcessingScheduler, ProcessingToken, ProgressCallback, ProgressUpdate,
    RunOutcome, YIELD_INTERVAL,
};

pub use types::{Bounds, PenState, Point, Polyline, Segment, ToolpathEvent};

pub use units::MeasurementSystem;
