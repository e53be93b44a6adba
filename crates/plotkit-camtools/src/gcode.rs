//! Toolpath and G-code generation
//!
//! Runs the pen state machine over ordered segments to produce the toolpath
//! event log, then renders the log as G-code.
//!
//! The pen starts lifted at the configured start position. Gaps between
//! consecutive segments longer than `z_hop_threshold` lift the pen; shorter
//! gaps are dragged with the pen down and count as drawing.

use crate::params::PlotParameters;
use crate::progress::{Stage, StageMonitor};
use plotkit_core::units::format_coordinate;
use plotkit_core::{PenState, Point, ProcessingToken, Result, Segment, ToolpathEvent};

/// Event log with accumulated motion lengths, physical units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Toolpath {
    pub events: Vec<ToolpathEvent>,
    pub draw_length: f64,
    pub travel_length: f64,
}

impl Toolpath {
    /// Number of pen lifts, excluding the final lift at the end of the job.
    pub fn pen_lifts(&self) -> usize {
        let ups = self
            .events
            .iter()
            .filter(|e| matches!(e, ToolpathEvent::PenUp { .. }))
            .count();
        ups.saturating_sub(1)
    }
}

/// G-code text together with the toolpath it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct GcodeOutput {
    pub text: String,
    pub toolpath: Toolpath,
}

/// Pen state machine producing the toolpath event log.
#[derive(Debug)]
struct PenPlanner {
    pen: PenState,
    position: Point,
    z_hop_threshold: f64,
    toolpath: Toolpath,
}

impl PenPlanner {
    fn new(start: Point, z_hop_threshold: f64) -> Self {
        Self {
            pen: PenState::Up,
            position: start,
            z_hop_threshold,
            toolpath: Toolpath::default(),
        }
    }

    fn push(&mut self, event: ToolpathEvent) {
        match event {
            ToolpathEvent::Draw { .. } => self.toolpath.draw_length += event.length(),
            ToolpathEvent::Travel { .. } => self.toolpath.travel_length += event.length(),
            ToolpathEvent::PenDown { .. } => self.pen = PenState::Down,
            ToolpathEvent::PenUp { .. } => self.pen = PenState::Up,
        }
        self.position = event.end_point();
        self.toolpath.events.push(event);
    }

    fn visit(&mut self, segment: &Segment) {
        let start = segment.start();
        let gap = self.position.distance_to(&start);

        if gap > 0.0 {
            match self.pen {
                PenState::Down if gap > self.z_hop_threshold => {
                    self.push(ToolpathEvent::PenUp { at: self.position });
                    self.push(ToolpathEvent::Travel {
                        start: self.position,
                        end: start,
                    });
                }
                PenState::Down => self.push(ToolpathEvent::Draw {
                    start: self.position,
                    end: start,
                }),
                PenState::Up => self.push(ToolpathEvent::Travel {
                    start: self.position,
                    end: start,
                }),
            }
        }

        if self.pen == PenState::Up {
            self.push(ToolpathEvent::PenDown { at: start });
        }
        self.push(ToolpathEvent::Draw {
            start,
            end: segment.end(),
        });
    }

    fn finish(mut self) -> Toolpath {
        if self.pen == PenState::Down {
            self.push(ToolpathEvent::PenUp { at: self.position });
        }
        self.toolpath
    }
}

/// Build the toolpath event log for segments in plotting order.
pub async fn plan_toolpath(
    segments: &[Segment],
    params: &PlotParameters,
    token: &ProcessingToken,
) -> Result<Toolpath> {
    let mut monitor = StageMonitor::begin(token, Stage::Generate)?;
    let mut planner = PenPlanner::new(
        Point::new(params.start_x, params.start_y),
        params.z_hop_threshold,
    );

    let total = segments.len();
    for (index, segment) in segments.iter().enumerate() {
        planner.visit(segment);
        monitor.advance(1, index + 1, total).await?;
    }

    monitor.finish()?;
    Ok(planner.finish())
}

/// Plan the toolpath and render it as G-code.
pub async fn generate_gcode(
    segments: &[Segment],
    params: &PlotParameters,
    token: &ProcessingToken,
) -> Result<GcodeOutput> {
    let toolpath = plan_toolpath(segments, params, token).await?;
    let text = GcodeWriter::new(params).render(&toolpath);
    token.check()?;
    tracing::debug!(
        "Generated {} events, {} bytes of G-code",
        toolpath.events.len(),
        text.len()
    );
    Ok(GcodeOutput { text, toolpath })
}

/// Renders toolpath events as G-code text.
///
/// Output is deterministic: identical toolpaths and parameters always render
/// to identical text.
pub struct GcodeWriter<'a> {
    params: &'a PlotParameters,
}

impl<'a> GcodeWriter<'a> {
    pub fn new(params: &'a PlotParameters) -> Self {
        Self { params }
    }

    fn coord(&self, value: f64) -> String {
        format_coordinate(value, self.params.decimal_places)
    }

    fn rate(&self, value: f64) -> String {
        format!("{:.0}", value)
    }

    pub fn render(&self, toolpath: &Toolpath) -> String {
        let mut gcode = String::new();
        self.write_header(&mut gcode, toolpath);
        for event in &toolpath.events {
            gcode.push_str(&self.event_line(event));
            gcode.push('\n');
        }
        self.write_footer(&mut gcode);
        gcode
    }

    fn write_header(&self, gcode: &mut String, toolpath: &Toolpath) {
        let p = self.params;
        let unit = p.units.label();
        gcode.push_str("; Pen plotter toolpath\n");
        gcode.push_str(&format!("; Feed rate: {} {}/min\n", self.rate(p.feed_rate), unit));
        gcode.push_str(&format!(
            "; Travel rate: {} {}/min\n",
            self.rate(p.travel_rate),
            unit
        ));
        gcode.push_str(&format!(
            "; Draw length: {} {}\n",
            self.coord(toolpath.draw_length),
            unit
        ));
        gcode.push_str(&format!(
            "; Travel length: {} {}\n",
            self.coord(toolpath.travel_length),
            unit
        ));
        gcode.push_str(";\n");

        gcode.push_str(&format!("{} ; Units\n", p.units.gcode_word()));
        gcode.push_str("G90 ; Absolute positioning\n");
        gcode.push_str(&format!(
            "G0 Z{} ; Pen up to safe height\n",
            self.coord(p.pen_up_depth)
        ));
        gcode.push_str(&format!("F{}\n", self.rate(p.feed_rate)));
    }

    fn event_line(&self, event: &ToolpathEvent) -> String {
        let p = self.params;
        match event {
            ToolpathEvent::Travel { end, .. } => format!(
                "G0 X{} Y{} F{}",
                self.coord(end.x),
                self.coord(end.y),
                self.rate(p.travel_rate)
            ),
            ToolpathEvent::Draw { end, .. } => format!(
                "G1 X{} Y{} F{}",
                self.coord(end.x),
                self.coord(end.y),
                self.rate(p.feed_rate)
            ),
            ToolpathEvent::PenDown { .. } => format!(
                "G1 Z{} F{}",
                self.coord(p.pen_down_depth),
                self.rate(p.feed_rate)
            ),
            ToolpathEvent::PenUp { .. } => format!(
                "G1 Z{} F{}",
                self.coord(p.pen_up_depth),
                self.rate(p.travel_rate)
            ),
        }
    }

    fn write_footer(&self, gcode: &mut String) {
        gcode.push_str(&format!("G0 Z{}\n", self.coord(self.params.pen_up_depth)));
        gcode.push_str(&format!("G0 X{} Y{}\n", self.coord(0.0), self.coord(0.0)));
        gcode.push_str("M2 ; End of program\n");
    }
}
