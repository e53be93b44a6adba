//! Preview SVG rendering.
//!
//! Draws every normalized stroke as a `<polyline>` and marks pen transitions
//! with triangles: at each pen-down one pointing along the first draw move,
//! and at each pen-up one ending on the lift point, pointing along the last
//! draw move. Travel moves are optionally drawn dashed.
//!
//! Pure string building, no I/O.

use crate::params::PreviewOptions;
use plotkit_core::{Bounds, Point, Polyline, ToolpathEvent};
use std::fmt::Write;

const STROKE_COLOR: &str = "#222222";
const PEN_DOWN_COLOR: &str = "#2e7d32";
const PEN_UP_COLOR: &str = "#c62828";
const TRAVEL_COLOR: &str = "#1e88e5";

/// Renders preview markup.
pub struct PreviewRenderer<'a> {
    options: &'a PreviewOptions,
    decimals: usize,
}

impl<'a> PreviewRenderer<'a> {
    pub fn new(options: &'a PreviewOptions, decimals: usize) -> Self {
        Self { options, decimals }
    }

    fn num(&self, value: f64) -> String {
        plotkit_core::units::format_coordinate(value, self.decimals)
    }

    /// Render strokes and toolpath markers inside a viewBox equal to `bounds`.
    ///
    /// Zero-width or zero-height bounds are widened to one unit so the
    /// viewBox stays valid.
    pub fn render(
        &self,
        polylines: &[Polyline],
        events: &[ToolpathEvent],
        bounds: &Bounds,
    ) -> String {
        let mut out = String::new();
        let width = if bounds.width() > 0.0 { bounds.width() } else { 1.0 };
        let height = if bounds.height() > 0.0 {
            bounds.height()
        } else {
            1.0
        };

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            self.num(bounds.min_x),
            self.num(bounds.min_y),
            self.num(width),
            self.num(height),
        );

        let _ = writeln!(
            out,
            r#"  <g fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round">"#,
            STROKE_COLOR,
            self.num(self.options.stroke_width),
        );
        for polyline in polylines {
            let _ = writeln!(
                out,
                r#"    <polyline points="{}"/>"#,
                self.points_attr(&polyline.points)
            );
        }
        let _ = writeln!(out, "  </g>");

        if self.options.show_travel {
            self.write_travel(&mut out, events);
        }
        if self.options.marker_size > 0.0 {
            self.write_markers(&mut out, events);
        }

        let _ = writeln!(out, "</svg>");
        out
    }

    fn points_attr(&self, points: &[Point]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", self.num(p.x), self.num(p.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn write_travel(&self, out: &mut String, events: &[ToolpathEvent]) {
        let dash = self.num(self.options.stroke_width * 3.0);
        let _ = writeln!(
            out,
            r#"  <g fill="none" stroke="{}" stroke-width="{}" stroke-dasharray="{} {}">"#,
            TRAVEL_COLOR,
            self.num(self.options.stroke_width / 2.0),
            dash,
            dash,
        );
        for event in events {
            if let ToolpathEvent::Travel { start, end } = event {
                let _ = writeln!(
                    out,
                    r#"    <line x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
                    self.num(start.x),
                    self.num(start.y),
                    self.num(end.x),
                    self.num(end.y),
                );
            }
        }
        let _ = writeln!(out, "  </g>");
    }

    fn write_markers(&self, out: &mut String, events: &[ToolpathEvent]) {
        let size = self.options.marker_size;
        let _ = writeln!(out, r#"  <g class="markers" stroke="none">"#);
        for (index, event) in events.iter().enumerate() {
            match event {
                ToolpathEvent::PenDown { at } => {
                    let direction = draw_direction(events[index + 1..].iter());
                    let _ = writeln!(
                        out,
                        r#"    <polygon class="pen-down" fill="{}" points="{}"/>"#,
                        PEN_DOWN_COLOR,
                        self.points_attr(&arrow_head(*at, direction, size)),
                    );
                }
                ToolpathEvent::PenUp { at } => {
                    let (dx, dy) = draw_direction(events[..index].iter().rev());
                    let base = Point::new(at.x - dx * size, at.y - dy * size);
                    let _ = writeln!(
                        out,
                        r#"    <polygon class="pen-up" fill="{}" points="{}"/>"#,
                        PEN_UP_COLOR,
                        self.points_attr(&arrow_head(base, (dx, dy), size)),
                    );
                }
                _ => {}
            }
        }
        let _ = writeln!(out, "  </g>");
    }
}

/// Unit direction of the first non-degenerate draw move in `events`, or +X.
fn draw_direction<'e>(mut events: impl Iterator<Item = &'e ToolpathEvent>) -> (f64, f64) {
    events
        .find_map(|e| match e {
            ToolpathEvent::Draw { start, end } => {
                let length = start.distance_to(end);
                (length > 0.0).then(|| ((end.x - start.x) / length, (end.y - start.y) / length))
            }
            _ => None,
        })
        .unwrap_or((1.0, 0.0))
}

/// Triangle with its tip `size` ahead of `at` along `direction`.
fn arrow_head(at: Point, direction: (f64, f64), size: f64) -> [Point; 3] {
    let (dx, dy) = direction;
    let (nx, ny) = (-dy, dx);
    let half = size / 2.0;
    [
        Point::new(at.x + dx * size, at.y + dy * size),
        Point::new(at.x + nx * half, at.y + ny * half),
        Point::new(at.x - nx * half, at.y - ny * half),
    ]
}
