use plotkit_camtools::{normalize, optimize_route, segment, PlotParameters};
use plotkit_core::{Bounds, Point, Polyline, ProcessingToken, Segment};
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

fn coordinate() -> impl Strategy<Value = f64> {
    -500.0..500.0f64
}

fn segment_strategy() -> impl Strategy<Value = Segment> {
    (coordinate(), coordinate(), coordinate(), coordinate(), 0..50usize)
        .prop_map(|(x1, y1, x2, y2, id)| Segment::new(Point::new(x1, y1), Point::new(x2, y2), id))
}

fn polyline_strategy() -> impl Strategy<Value = Polyline> {
    prop::collection::vec((coordinate(), coordinate()), 2..12).prop_map(|points| {
        Polyline {
            id: 0,
            points: points.into_iter().map(|(x, y)| Point::new(x, y)).collect(),
        }
    })
}

/// Endpoint pair in a canonical direction, for multiset comparison.
fn canonical(segment: &Segment) -> (u64, u64, u64, u64, usize) {
    let a = (segment.x1.to_bits(), segment.y1.to_bits());
    let b = (segment.x2.to_bits(), segment.y2.to_bits());
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    (first.0, first.1, second.0, second.1, segment.source_id)
}

proptest! {
    #[test]
    fn optimized_route_is_a_permutation_with_reversal(
        segments in prop::collection::vec(segment_strategy(), 0..60),
        start in (coordinate(), coordinate()),
    ) {
        let ordered = block_on(optimize_route(
            segments.clone(),
            Point::new(start.0, start.1),
            true,
            &ProcessingToken::detached(None),
        ))
        .unwrap();

        prop_assert_eq!(ordered.len(), segments.len());

        let mut before: Vec<_> = segments.iter().map(canonical).collect();
        let mut after: Vec<_> = ordered.iter().map(canonical).collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);

        let length_before: f64 = segments.iter().map(Segment::length).sum();
        let length_after: f64 = ordered.iter().map(Segment::length).sum();
        prop_assert!((length_before - length_after).abs() <= 1e-6 * length_before.max(1.0));
    }

    #[test]
    fn auto_origin_puts_min_corner_on_margin(
        polylines in prop::collection::vec(polyline_strategy(), 1..6),
        margin in 0.0..50.0f64,
        scale in 0.01..10.0f64,
        flip in any::<bool>(),
    ) {
        let params = PlotParameters {
            auto_origin: true,
            margin,
            units_per_physical_unit: scale,
            flip_vertical: flip,
            ..Default::default()
        };
        let result = block_on(normalize(polylines, &params, &ProcessingToken::detached(None)))
            .unwrap();
        prop_assert_eq!(result.bounds.min_x, margin);
        prop_assert_eq!(result.bounds.min_y, margin);
        prop_assert_eq!(result.bounds, Bounds::from_polylines(&result.polylines));
    }

    #[test]
    fn segments_have_no_degenerate_edges(polylines in prop::collection::vec(polyline_strategy(), 0..6)) {
        let segments = block_on(segment(&polylines, &ProcessingToken::detached(None))).unwrap();
        prop_assert!(segments.iter().all(|s| s.length() >= 1e-5));
        let max: usize = polylines.iter().map(|p| p.points.len() - 1).sum();
        prop_assert!(segments.len() <= max);
    }
}
