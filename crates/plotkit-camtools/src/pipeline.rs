//! End-to-end toolpath pipeline and the session that schedules it.

use crate::gcode::generate_gcode;
use crate::normalize::normalize;
use crate::params::PlotParameters;
use crate::preview::PreviewRenderer;
use crate::route::optimize_route;
use crate::segment::segment;
use crate::stats::PlotStatistics;
use crate::svg_import::GeometryExtractor;
use parking_lot::Mutex;
use plotkit_core::{
    Bounds, Debouncer, Point, ProcessingError, ProcessingScheduler, ProcessingToken,
    ProgressCallback, ProgressUpdate, Result, RunOutcome, ToolpathEvent,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Default debounce delay for [`PlotSession::submit_debounced`].
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Everything a completed run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotResult {
    pub gcode: String,
    pub preview_svg: String,
    pub statistics: PlotStatistics,
    pub events: Vec<ToolpathEvent>,
    /// Bounds of the normalized geometry
    pub bounds: Bounds,
}

impl PlotResult {
    /// Toolpath event log as pretty-printed JSON.
    pub fn events_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.events)
    }
}

/// Runs extraction, normalization, segmentation, route optimization and
/// G-code generation for one set of parameters.
#[derive(Debug, Clone)]
pub struct PlotPipeline {
    params: PlotParameters,
}

impl PlotPipeline {
    pub fn new(params: PlotParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlotParameters {
        &self.params
    }

    /// Run the full pipeline on SVG markup.
    ///
    /// Returns nothing partial: any failure, cancellation or timeout aborts
    /// the whole run.
    pub async fn run(&self, markup: &str, token: &ProcessingToken) -> Result<PlotResult> {
        let params = &self.params;
        params.validate()?;

        let extracted = GeometryExtractor::new(params).extract(markup, token).await?;
        if extracted.polylines.is_empty() {
            return Err(ProcessingError::EmptyResult);
        }

        let normalized = normalize(extracted.polylines, params, token).await?;
        let segments = segment(&normalized.polylines, token).await?;
        let segment_count = segments.len();

        let start = Point::new(params.start_x, params.start_y);
        let ordered = optimize_route(segments, start, params.optimize_route, token).await?;
        let output = generate_gcode(&ordered, params, token).await?;

        let statistics = PlotStatistics::new(
            normalized.polylines.len(),
            segment_count,
            &output.toolpath,
            params,
        );
        let preview_svg = PreviewRenderer::new(&params.preview, params.decimal_places).render(
            &normalized.polylines,
            &output.toolpath.events,
            &normalized.bounds,
        );

        token.check()?;
        token.report_progress(100.0, "Done");

        Ok(PlotResult {
            gcode: output.text,
            preview_svg,
            statistics,
            events: output.toolpath.events,
            bounds: normalized.bounds,
        })
    }
}

/// Long-lived owner of the current run and the last completed result.
///
/// Each submission supersedes the run in flight. Only runs that complete
/// while still current replace [`PlotSession::latest`].
pub struct PlotSession {
    scheduler: ProcessingScheduler<PlotResult>,
    debouncer: Debouncer,
    params: Mutex<PlotParameters>,
}

impl PlotSession {
    pub fn new(params: PlotParameters) -> Self {
        Self {
            scheduler: ProcessingScheduler::new(),
            debouncer: Debouncer::new(DEFAULT_DEBOUNCE),
            params: Mutex::new(params),
        }
    }

    /// Wall-clock budget per run (`None` = unbounded).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.scheduler = self.scheduler.with_timeout(timeout);
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    pub fn with_progress_observer(mut self, observer: ProgressCallback) -> Self {
        self.scheduler = self.scheduler.with_progress_observer(observer);
        self
    }

    pub fn parameters(&self) -> PlotParameters {
        self.params.lock().clone()
    }

    /// Replace the parameters used by subsequent submissions.
    pub fn set_parameters(&self, params: PlotParameters) {
        *self.params.lock() = params;
    }

    /// Start a run immediately, superseding any run in flight.
    pub async fn submit(&self, markup: &str) -> RunOutcome<PlotResult> {
        let pipeline = PlotPipeline::new(self.parameters());
        self.scheduler
            .run(|token| async move { pipeline.run(markup, &token).await })
            .await
    }

    /// Start a run once submissions have been quiet for the debounce delay.
    ///
    /// Submissions overtaken by a newer one during the delay return
    /// [`RunOutcome::Superseded`] without running.
    pub async fn submit_debounced(&self, markup: &str) -> RunOutcome<PlotResult> {
        if !self.debouncer.settle().await {
            tracing::trace!("Submission debounced");
            return RunOutcome::Superseded;
        }
        self.submit(markup).await
    }

    /// The most recent completed result.
    pub fn latest(&self) -> Option<Arc<PlotResult>> {
        self.scheduler.latest()
    }

    /// Progress of the run in flight, if any.
    pub fn progress(&self) -> Option<ProgressUpdate> {
        self.scheduler.current_token().map(|token| token.progress())
    }

    /// Cancel the run in flight. The last completed result is kept.
    pub fn cancel(&self) {
        self.scheduler.cancel_current();
    }
}
