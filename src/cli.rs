//! Command-line arguments.

use clap::Parser;
use plotkit_core::MeasurementSystem;
use plotkit_settings::Config;
use std::path::PathBuf;

/// Convert an SVG drawing into pen-plotter G-code.
#[derive(Debug, Parser)]
#[command(name = "plotkit", version, about)]
pub struct Cli {
    /// Input SVG file
    pub input: PathBuf,

    /// G-code output file [default: input with .gcode extension]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a preview SVG
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Write the toolpath event log as JSON
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,

    /// Config file (.toml or .json) [default: platform config directory]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration to this file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Multiplier from document units to physical units
    #[arg(long)]
    pub scale: Option<f64>,

    #[arg(long)]
    pub margin: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub offset_x: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub offset_y: Option<f64>,

    /// Longest sampled edge when flattening curves
    #[arg(long)]
    pub max_segment_length: Option<f64>,

    /// Samples per circle or ellipse
    #[arg(long)]
    pub circle_resolution: Option<u32>,

    #[arg(long)]
    pub feed_rate: Option<f64>,

    #[arg(long)]
    pub travel_rate: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub pen_down: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub pen_up: Option<f64>,

    /// Gaps up to this length are drawn without lifting the pen
    #[arg(long)]
    pub z_hop: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub start_x: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub start_y: Option<f64>,

    /// Move the drawing so its bounding box starts at the margin
    #[arg(long)]
    pub auto_origin: bool,

    /// Negate the Y axis
    #[arg(long)]
    pub flip: bool,

    /// Keep strokes in document order
    #[arg(long)]
    pub no_optimize: bool,

    /// Output units: metric or imperial
    #[arg(long)]
    pub units: Option<MeasurementSystem>,

    /// Processing time budget in milliseconds (0 = unbounded)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Overlay command-line values onto a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        let plot = &mut config.plot;
        let overrides = [
            (self.scale, &mut plot.units_per_physical_unit),
            (self.margin, &mut plot.margin),
            (self.offset_x, &mut plot.offset_x),
            (self.offset_y, &mut plot.offset_y),
            (self.max_segment_length, &mut plot.max_segment_length),
            (self.feed_rate, &mut plot.feed_rate),
            (self.travel_rate, &mut plot.travel_rate),
            (self.pen_down, &mut plot.pen_down_depth),
            (self.pen_up, &mut plot.pen_up_depth),
            (self.z_hop, &mut plot.z_hop_threshold),
            (self.start_x, &mut plot.start_x),
            (self.start_y, &mut plot.start_y),
        ];
        for (value, target) in overrides {
            if let Some(value) = value {
                *target = value;
            }
        }

        if let Some(resolution) = self.circle_resolution {
            plot.circle_resolution = resolution;
        }
        if let Some(units) = self.units {
            plot.units = units;
        }
        if self.auto_origin {
            plot.auto_origin = true;
        }
        if self.flip {
            plot.flip_vertical = true;
        }
        if self.no_optimize {
            plot.optimize_route = false;
        }

        if let Some(timeout_ms) = self.timeout_ms {
            config.processing.timeout_ms = timeout_ms;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.log_json {
            config.logging.json = true;
        }
    }
}
