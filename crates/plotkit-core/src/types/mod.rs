//! Data model shared by every pipeline stage.
//!
//! ## Modules
//!
//! - [`geometry`]: points, bounds, polylines and directed segments
//! - [`toolpath`]: pen state and the toolpath event log

pub mod geometry;
pub mod toolpath;

pub use geometry::{Bounds, Point, Polyline, Segment};
pub use toolpath::{PenState, ToolpathEvent};
