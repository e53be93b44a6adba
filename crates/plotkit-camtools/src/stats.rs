//! Job statistics.

use crate::gcode::Toolpath;
use crate::params::PlotParameters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of a generated job. Lengths are in physical units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotStatistics {
    pub stroke_count: usize,
    pub segment_count: usize,
    pub draw_length: f64,
    pub travel_length: f64,
    pub pen_lifts: usize,
    /// Motion time at the configured feed and travel rates, in seconds
    pub estimated_time_secs: f64,
}

impl PlotStatistics {
    pub fn new(
        stroke_count: usize,
        segment_count: usize,
        toolpath: &Toolpath,
        params: &PlotParameters,
    ) -> Self {
        let draw_time = toolpath.draw_length / params.feed_rate * 60.0;
        let travel_time = toolpath.travel_length / params.travel_rate * 60.0;
        Self {
            stroke_count,
            segment_count,
            draw_length: toolpath.draw_length,
            travel_length: toolpath.travel_length,
            pen_lifts: toolpath.pen_lifts(),
            estimated_time_secs: draw_time + travel_time,
        }
    }
}

impl fmt::Display for PlotStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strokes:        {}", self.stroke_count)?;
        writeln!(f, "Segments:       {}", self.segment_count)?;
        writeln!(f, "Draw length:    {:.2}", self.draw_length)?;
        writeln!(f, "Travel length:  {:.2}", self.travel_length)?;
        writeln!(f, "Pen lifts:      {}", self.pen_lifts)?;
        write!(f, "Estimated time: {:.1} s", self.estimated_time_secs)
    }
}
