//! Coordinate normalization
//!
//! Maps document-space polylines into physical space: one linear map per axis
//! (scale, with optional vertical flip) followed by a single translation for
//! the whole drawing.

use crate::params::PlotParameters;
use crate::progress::{Stage, StageMonitor};
use plotkit_core::{Bounds, Point, Polyline, ProcessingToken, Result};

/// Polylines in physical space together with their bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry {
    pub polylines: Vec<Polyline>,
    pub bounds: Bounds,
}

/// Per-axis linear map followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMap {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Subtracted after scaling (the scaled minimum corner under auto-origin)
    pub anchor: Point,
    /// Added last
    pub shift: Point,
}

impl AxisMap {
    /// Build the map for a drawing whose scaled bounds are `scaled_bounds`.
    pub fn new(params: &PlotParameters, scaled_bounds: &Bounds) -> Self {
        let scale_x = params.units_per_physical_unit;
        let scale_y = if params.flip_vertical {
            -params.units_per_physical_unit
        } else {
            params.units_per_physical_unit
        };

        if params.auto_origin {
            Self {
                scale_x,
                scale_y,
                anchor: Point::new(scaled_bounds.min_x, scaled_bounds.min_y),
                shift: Point::new(params.margin, params.margin),
            }
        } else {
            Self {
                scale_x,
                scale_y,
                anchor: Point::new(0.0, 0.0),
                shift: Point::new(params.margin + params.offset_x, params.margin + params.offset_y),
            }
        }
    }

    /// Scale only.
    pub fn scale(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x, p.y * self.scale_y)
    }

    /// Scale then translate.
    pub fn apply(&self, p: Point) -> Point {
        let scaled = self.scale(p);
        Point::new(
            (scaled.x - self.anchor.x) + self.shift.x,
            (scaled.y - self.anchor.y) + self.shift.y,
        )
    }
}

/// Normalize polylines into physical space.
///
/// With `auto_origin`, the minimum corner of the output bounds is exactly
/// `(margin, margin)` for non-empty input.
pub async fn normalize(
    polylines: Vec<Polyline>,
    params: &PlotParameters,
    token: &ProcessingToken,
) -> Result<NormalizedGeometry> {
    let mut monitor = StageMonitor::begin(token, Stage::Normalize)?;

    let scaling = AxisMap::new(params, &Bounds::default());
    let scaled: Vec<Point> = polylines
        .iter()
        .flat_map(|p| p.points.iter())
        .map(|p| scaling.scale(*p))
        .collect();
    let scaled_bounds = Bounds::from_points(&scaled);
    let map = AxisMap::new(params, &scaled_bounds);

    let total = polylines.len();
    let mut output = Vec::with_capacity(total);
    for (index, polyline) in polylines.into_iter().enumerate() {
        let count = polyline.points.len();
        let points = polyline.points.into_iter().map(|p| map.apply(p)).collect();
        output.push(Polyline {
            id: polyline.id,
            points,
        });
        monitor.advance(count, index + 1, total).await?;
    }

    monitor.finish()?;

    let bounds = Bounds::from_polylines(&output);
    Ok(NormalizedGeometry {
        polylines: output,
        bounds,
    })
}
