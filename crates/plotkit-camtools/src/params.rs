//! Plot parameters
//!
//! Every option recognised by the toolpath pipeline, with defaults and
//! validation. Lengths are in physical units (millimeters for metric output,
//! inches for imperial) unless noted otherwise.

use crate::error::{ParameterError, ParameterResult};
use plotkit_core::MeasurementSystem;
use serde::{Deserialize, Serialize};

/// Bounds applied to the circle/ellipse sample count.
pub const MIN_CIRCLE_RESOLUTION: u32 = 8;
pub const MAX_CIRCLE_RESOLUTION: u32 = 720;

/// Preview rendering options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    /// Size of the pen-down/pen-up marker glyphs
    pub marker_size: f64,
    /// Stroke width of drawn polylines
    pub stroke_width: f64,
    /// Draw travel moves as dashed lines
    pub show_travel: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            marker_size: 1.0,
            stroke_width: 0.3,
            show_travel: false,
        }
    }
}

/// Parameters for converting a vector drawing into a plotter toolpath
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotParameters {
    /// Multiplier from document units to physical units
    pub units_per_physical_unit: f64,
    /// Margin added around the drawing
    pub margin: f64,
    /// X offset applied when auto-origin is off
    pub offset_x: f64,
    /// Y offset applied when auto-origin is off
    pub offset_y: f64,
    /// Longest sampled edge when flattening curves
    pub max_segment_length: f64,
    /// Samples per full circle or ellipse (clamped to 8..=720)
    pub circle_resolution: u32,
    /// Feed rate for drawing moves (units/min)
    pub feed_rate: f64,
    /// Feed rate for pen lifts and travel (units/min)
    pub travel_rate: f64,
    /// Z height with the pen touching the medium
    pub pen_down_depth: f64,
    /// Z height with the pen lifted
    pub pen_up_depth: f64,
    /// Gaps up to this length are dragged with the pen down
    pub z_hop_threshold: f64,
    /// Tool start position X
    pub start_x: f64,
    /// Tool start position Y
    pub start_y: f64,
    /// Move the drawing so its bounding box starts at (margin, margin)
    pub auto_origin: bool,
    /// Negate the Y axis
    pub flip_vertical: bool,
    /// Reorder strokes to reduce travel
    pub optimize_route: bool,
    /// Output measurement system
    pub units: MeasurementSystem,
    /// Curve flattening tolerance
    pub curve_tolerance: f64,
    /// Decimal places for G-code coordinates
    pub decimal_places: usize,
    /// Preview rendering
    pub preview: PreviewOptions,
}

impl Default for PlotParameters {
    fn default() -> Self {
        Self {
            units_per_physical_unit: 1.0,
            margin: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            max_segment_length: 0.5,
            circle_resolution: 72,
            feed_rate: 1500.0,
            travel_rate: 3000.0,
            pen_down_depth: 0.0,
            pen_up_depth: 5.0,
            z_hop_threshold: 0.5,
            start_x: 0.0,
            start_y: 0.0,
            auto_origin: false,
            flip_vertical: false,
            optimize_route: true,
            units: MeasurementSystem::Metric,
            curve_tolerance: 0.05,
            decimal_places: 3,
            preview: PreviewOptions::default(),
        }
    }
}

impl PlotParameters {
    /// Validate all values, returning the first problem found.
    pub fn validate(&self) -> ParameterResult<()> {
        let finite = [
            ("units_per_physical_unit", self.units_per_physical_unit),
            ("margin", self.margin),
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("pen_down_depth", self.pen_down_depth),
            ("pen_up_depth", self.pen_up_depth),
            ("start_x", self.start_x),
            ("start_y", self.start_y),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ParameterError::invalid(name, "must be finite"));
            }
        }

        let positive = [
            ("units_per_physical_unit", self.units_per_physical_unit),
            ("max_segment_length", self.max_segment_length),
            ("feed_rate", self.feed_rate),
            ("travel_rate", self.travel_rate),
            ("curve_tolerance", self.curve_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParameterError::invalid(name, "must be positive"));
            }
        }

        if self.margin < 0.0 {
            return Err(ParameterError::invalid("margin", "must not be negative"));
        }

        if !(self.z_hop_threshold.is_finite() && self.z_hop_threshold >= 0.0) {
            return Err(ParameterError::OutOfRange {
                name: "z_hop_threshold".to_string(),
                value: self.z_hop_threshold,
                min: 0.0,
                max: f64::MAX,
            });
        }

        if self.decimal_places > 6 {
            return Err(ParameterError::OutOfRange {
                name: "decimal_places".to_string(),
                value: self.decimal_places as f64,
                min: 0.0,
                max: 6.0,
            });
        }

        if !(self.preview.marker_size.is_finite() && self.preview.marker_size >= 0.0) {
            return Err(ParameterError::invalid(
                "preview.marker_size",
                "must be zero or positive",
            ));
        }

        Ok(())
    }

    /// Circle resolution clamped to the supported range.
    pub fn effective_circle_resolution(&self) -> u32 {
        self.circle_resolution
            .clamp(MIN_CIRCLE_RESOLUTION, MAX_CIRCLE_RESOLUTION)
    }

    /// Maximum segment length converted to document units.
    pub fn document_segment_length(&self) -> f64 {
        self.max_segment_length / self.units_per_physical_unit.abs()
    }

    /// Curve tolerance converted to document units.
    pub fn document_tolerance(&self) -> f64 {
        self.curve_tolerance / self.units_per_physical_unit.abs()
    }
}
