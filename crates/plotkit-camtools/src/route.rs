//! Greedy nearest-neighbor route ordering.
//!
//! Reorders segments to cut pen-up travel. Each segment may be reversed; the
//! output is always a permutation of the input up to per-segment reversal.
//! This is a heuristic: no global optimum is sought and ties are resolved by
//! scan order (the start endpoint of a segment is scanned before its end, and
//! earlier remaining segments before later ones).

use crate::progress::{Stage, StageMonitor};
use plotkit_core::{Point, ProcessingToken, Result, Segment};

/// Which endpoint of a segment the route enters through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Start,
    End,
}

/// Find the remaining segment endpoint closest to `current`.
///
/// Strict comparison keeps the first candidate on ties.
fn nearest(remaining: &[Segment], current: Point) -> Option<(usize, Entry)> {
    let mut best: Option<(usize, Entry, f64)> = None;
    for (index, segment) in remaining.iter().enumerate() {
        for (entry, point) in [(Entry::Start, segment.start()), (Entry::End, segment.end())] {
            let distance = current.distance_squared_to(&point);
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some((index, entry, distance));
            }
        }
    }
    best.map(|(index, entry, _)| (index, entry))
}

/// Order segments for plotting starting from `start`.
///
/// With `optimize` off, segments pass through in their original order.
/// Cancellation leaves no partial result: the error is returned and the
/// working set is dropped.
pub async fn optimize_route(
    segments: Vec<Segment>,
    start: Point,
    optimize: bool,
    token: &ProcessingToken,
) -> Result<Vec<Segment>> {
    let mut monitor = StageMonitor::begin(token, Stage::Optimize)?;
    let total = segments.len();

    if !optimize {
        monitor.finish()?;
        return Ok(segments);
    }

    let mut remaining = segments;
    let mut ordered = Vec::with_capacity(total);
    let mut current = start;

    while let Some((index, entry)) = nearest(&remaining, current) {
        let segment = remaining.remove(index);
        let segment = match entry {
            Entry::Start => segment,
            Entry::End => segment.reversed(),
        };
        current = segment.end();
        ordered.push(segment);
        monitor.advance(1, ordered.len(), total).await?;
    }

    monitor.finish()?;
    tracing::debug!("Route ordered {} segments", ordered.len());
    Ok(ordered)
}

/// Total pen-up distance of visiting `segments` in order from `start`.
pub fn travel_distance(segments: &[Segment], start: Point) -> f64 {
    let mut current = start;
    let mut total = 0.0;
    for segment in segments {
        total += current.distance_to(&segment.start());
        current = segment.end();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64, id: usize) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2), id)
    }

    async fn order(segments: Vec<Segment>, optimize: bool) -> Vec<Segment> {
        optimize_route(
            segments,
            Point::new(0.0, 0.0),
            optimize,
            &ProcessingToken::detached(None),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_passthrough_when_disabled() {
        let input = vec![seg(50.0, 0.0, 60.0, 0.0, 0), seg(1.0, 0.0, 2.0, 0.0, 1)];
        assert_eq!(order(input.clone(), false).await, input);
    }

    #[tokio::test]
    async fn test_nearest_first_and_reversal() {
        let input = vec![
            seg(50.0, 0.0, 60.0, 0.0, 0),
            seg(5.0, 0.0, 1.0, 0.0, 1),
            seg(20.0, 0.0, 6.0, 0.0, 2),
        ];
        let result = order(input, true).await;
        assert_eq!(result[0], seg(1.0, 0.0, 5.0, 0.0, 1));
        assert_eq!(result[1], seg(6.0, 0.0, 20.0, 0.0, 2));
        assert_eq!(result[2], seg(50.0, 0.0, 60.0, 0.0, 0));
    }

    #[tokio::test]
    async fn test_ties_break_by_scan_order() {
        // Both segments start at distance 1 from the origin
        let input = vec![seg(1.0, 0.0, 2.0, 0.0, 0), seg(0.0, 1.0, 0.0, 2.0, 1)];
        let result = order(input, true).await;
        assert_eq!(result[0].source_id, 0);

        // Start and end of the same segment equidistant: start wins
        let input = vec![seg(0.0, 1.0, 0.0, -1.0, 0)];
        let result = order(input, true).await;
        assert_eq!(result[0], seg(0.0, 1.0, 0.0, -1.0, 0));
    }

    #[tokio::test]
    async fn test_optimization_reduces_travel() {
        let input = vec![
            seg(90.0, 0.0, 100.0, 0.0, 0),
            seg(0.0, 0.0, 10.0, 0.0, 1),
            seg(50.0, 0.0, 60.0, 0.0, 2),
        ];
        let origin = Point::new(0.0, 0.0);
        let before = travel_distance(&input, origin);
        let after = travel_distance(&order(input, true).await, origin);
        assert!(after < before);
        assert_eq!(after, 70.0);
    }

    #[tokio::test]
    async fn test_cancel_mid_route() {
        let token = ProcessingToken::detached(None);
        let segments: Vec<Segment> = (0..500)
            .map(|i| seg(i as f64, 0.0, i as f64 + 0.5, 0.0, i))
            .collect();

        let cancel = {
            let token = token.clone();
            async move {
                tokio::task::yield_now().await;
                token.cancel();
            }
        };
        let (result, _) = tokio::join!(
            optimize_route(segments, Point::new(0.0, 0.0), true, &token),
            cancel
        );
        assert!(result.unwrap_err().is_cancelled());
    }
}
