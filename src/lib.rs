//! # PlotKit
//!
//! Converts vector drawings into pen-plotter toolpaths:
//! - SVG geometry extraction (paths, basic shapes, nested transforms)
//! - Physical scaling, vertical flip, auto-origin and margins
//! - Greedy route optimization to cut pen-up travel
//! - G-code, SVG preview and job statistics
//!
//! ## Architecture
//!
//! PlotKit is organized as a workspace with multiple crates:
//!
//! 1. **plotkit-core** - Geometry types, errors, units, cooperative processing framework
//! 2. **plotkit-camtools** - Pipeline stages, G-code and preview generation, plot sessions
//! 3. **plotkit-settings** - Configuration files
//! 4. **plotkit** - Command-line binary that integrates all crates

pub mod cli;
pub mod output;

pub use plotkit_camtools::{
    PlotParameters, PlotPipeline, PlotResult, PlotSession, PlotStatistics, PreviewOptions,
};
pub use plotkit_core::{
    Bounds, MeasurementSystem, Point, Polyline, ProcessingError, ProcessingToken, RunOutcome,
    Segment, ToolpathEvent,
};
pub use plotkit_settings::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging on stderr with:
/// - `RUST_LOG` environment variable support, falling back to `level`
/// - Human-readable output, or JSON lines when `json` is set
///
/// Fails if the level is not a valid filter directive or a global
/// subscriber is already installed.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();
        registry.with(fmt_layer).try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}
