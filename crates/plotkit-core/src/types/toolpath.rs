//! Toolpath event log types.

use super::geometry::Point;
use serde::{Deserialize, Serialize};

/// Pen state of the plotter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenState {
    /// Pen lifted to the safe height.
    #[default]
    Up,
    /// Pen touching the medium.
    Down,
}

impl std::fmt::Display for PenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// One entry of the append-only toolpath log.
///
/// The log drives both G-code emission and the visual preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolpathEvent {
    /// Pen-down move that marks the medium.
    Draw { start: Point, end: Point },
    /// Pen-up repositioning move.
    Travel { start: Point, end: Point },
    /// Pen lowered at a point.
    PenDown { at: Point },
    /// Pen lifted at a point.
    PenUp { at: Point },
}

impl ToolpathEvent {
    /// Length of the XY motion described by this event.
    pub fn length(&self) -> f64 {
        match self {
            Self::Draw { start, end } | Self::Travel { start, end } => start.distance_to(end),
            Self::PenDown { .. } | Self::PenUp { .. } => 0.0,
        }
    }

    /// Position of the tool after this event.
    pub fn end_point(&self) -> Point {
        match self {
            Self::Draw { end, .. } | Self::Travel { end, .. } => *end,
            Self::PenDown { at } | Self::PenUp { at } => *at,
        }
    }
}
