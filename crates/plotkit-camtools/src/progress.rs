//! Per-stage progress reporting and suspension points.

use plotkit_core::{ProcessingToken, Result, YIELD_INTERVAL};

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Normalize,
    Segment,
    Optimize,
    Generate,
}

impl Stage {
    /// Share of overall progress covered by this stage, in percent.
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Extract => (0.0, 30.0),
            Self::Normalize => (30.0, 40.0),
            Self::Segment => (40.0, 50.0),
            Self::Optimize => (50.0, 80.0),
            Self::Generate => (80.0, 100.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Extract => "Extracting geometry",
            Self::Normalize => "Normalizing coordinates",
            Self::Segment => "Splitting into segments",
            Self::Optimize => "Optimizing route",
            Self::Generate => "Generating G-code",
        }
    }

    /// Overall percentage after `done` of `total` items of this stage.
    pub fn percent(self, done: usize, total: usize) -> f32 {
        let (start, end) = self.range();
        if total == 0 {
            return end;
        }
        let fraction = (done as f32 / total as f32).clamp(0.0, 1.0);
        start + (end - start) * fraction
    }
}

/// Drives the token for one stage: boundary checks, suspension and progress.
pub(crate) struct StageMonitor<'a> {
    token: &'a ProcessingToken,
    stage: Stage,
    processed: usize,
}

impl<'a> StageMonitor<'a> {
    /// Enter a stage. Fails if the run has already been invalidated.
    pub(crate) fn begin(token: &'a ProcessingToken, stage: Stage) -> Result<Self> {
        token.check()?;
        token.report_progress(stage.range().0, stage.label());
        tracing::debug!("{} started", stage.label());
        Ok(Self {
            token,
            stage,
            processed: 0,
        })
    }

    /// Account for `amount` processed items; yields once per interval boundary crossed.
    pub(crate) async fn advance(&mut self, amount: usize, done: usize, total: usize) -> Result<()> {
        let before = self.processed;
        self.processed += amount;
        if self.processed / YIELD_INTERVAL > before / YIELD_INTERVAL {
            self.token
                .report_progress(self.stage.percent(done, total), self.stage.label());
            self.token.yield_now().await?;
        }
        Ok(())
    }

    /// Leave the stage, re-checking the token at the boundary.
    pub(crate) fn finish(self) -> Result<()> {
        self.token.check()?;
        self.token
            .report_progress(self.stage.range().1, self.stage.label());
        tracing::debug!("{} finished ({} items)", self.stage.label(), self.processed);
        Ok(())
    }
}
