//! # PlotKit CAM Tools
//!
//! Converts SVG drawings into pen-plotter toolpaths.
//!
//! ## Pipeline Stages
//!
//! - **Geometry Extraction**: SVG primitives flattened into polylines, transforms resolved
//! - **Normalization**: scale, vertical flip, auto-origin or user offsets
//! - **Segmentation**: polylines broken into independent directed segments
//! - **Route Optimization**: greedy nearest-neighbor ordering with reversal
//! - **G-Code Generation**: pen state machine, event log and G-code text
//!
//! ## Outputs
//!
//! - **G-Code**: unit/positioning setup, one directive per toolpath event, footer
//! - **Preview**: SVG with strokes and pen-down/pen-up markers
//! - **Statistics**: stroke and segment counts, draw/travel lengths, pen lifts
//!
//! Every stage takes a [`plotkit_core::ProcessingToken`], yields cooperatively
//! and aborts as soon as the run is cancelled, superseded or out of time.

pub mod error;
pub mod gcode;
pub mod normalize;
pub mod params;
pub mod pipeline;
pub mod preview;
pub mod progress;
pub mod route;
pub mod segment;
pub mod stats;
pub mod svg_import;

// Re-export commonly used items
pub use error::{ParameterError, ParameterResult};
pub use gcode::{generate_gcode, plan_toolpath, GcodeOutput, GcodeWriter, Toolpath};
pub use normalize::{normalize, NormalizedGeometry};
pub use params::{PlotParameters, PreviewOptions};
pub use pipeline::{PlotPipeline, PlotResult, PlotSession};
pub use preview::PreviewRenderer;
pub use progress::Stage;
pub use route::{optimize_route, travel_distance};
pub use segment::segment;
pub use stats::PlotStatistics;
pub use svg_import::{ExtractedGeometry, GeometryExtractor};
