//! Break polylines into independent directed segments.

use crate::progress::{Stage, StageMonitor};
use plotkit_core::{Polyline, ProcessingToken, Result, Segment};

/// Point pairs closer than this are dropped as degenerate.
pub const SEGMENT_EPSILON: f64 = 1e-5;

/// Split every polyline into its consecutive point pairs, skipping
/// zero-length edges.
pub async fn segment(polylines: &[Polyline], token: &ProcessingToken) -> Result<Vec<Segment>> {
    let mut monitor = StageMonitor::begin(token, Stage::Segment)?;

    let total = polylines.len();
    let mut segments = Vec::new();
    for (index, polyline) in polylines.iter().enumerate() {
        let before = segments.len();
        segments.extend(
            polyline
                .points
                .windows(2)
                .filter(|w| w[0].distance_to(&w[1]) >= SEGMENT_EPSILON)
                .map(|w| Segment::new(w[0], w[1], polyline.id)),
        );
        monitor
            .advance(segments.len() - before, index + 1, total)
            .await?;
    }

    monitor.finish()?;
    tracing::debug!("{} polylines -> {} segments", total, segments.len());
    Ok(segments)
}
