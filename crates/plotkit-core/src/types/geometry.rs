//! Geometry primitives.
//!
//! All coordinates are `f64`. The same types are used for document space,
//! normalized physical space and device space; which space a value lives in
//! is determined by the stage that produced it.

use serde::{Deserialize, Serialize};

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_squared_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned bounding box.
///
/// Empty input yields the degenerate box `{0, 0, 0, 0}`, so consumers never
/// see infinite or NaN extents.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Computes the bounds of a point sequence.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
            return Self::default();
        }

        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Computes the bounds over every point of every polyline.
    pub fn from_polylines(polylines: &[Polyline]) -> Self {
        Self::from_points(polylines.iter().flat_map(|p| p.points.iter()))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// One continuous pen stroke extracted from a single source primitive.
///
/// Always holds at least two points. Closed shapes repeat their first point
/// at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Identifier of the originating primitive (document order).
    pub id: usize,
    pub points: Vec<Point>,
}

impl Polyline {
    /// Builds a polyline, returning `None` when fewer than two points are given.
    pub fn new(id: usize, points: Vec<Point>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self { id, points })
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// True when the last point equals the first.
    pub fn is_closed(&self) -> bool {
        self.first() == self.last()
    }

    /// Sum of the lengths of consecutive point pairs.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}

/// A directed straight line between two consecutive polyline points.
///
/// `source_id` names the originating polyline and is only used for
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub source_id: usize,
}

impl Segment {
    pub fn new(start: Point, end: Point, source_id: usize) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
            source_id,
        }
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    pub fn length(&self) -> f64 {
        self.start().distance_to(&self.end())
    }

    /// The same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            x1: self.x2,
            y1: self.y2,
            x2: self.x1,
            y2: self.y1,
            source_id: self.source_id,
        }
    }
}
