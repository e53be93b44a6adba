use plotkit_camtools::{plan_toolpath, PlotParameters};
use plotkit_core::{PenState, Point, ProcessingToken, Segment, ToolpathEvent};
use proptest::prelude::*;

fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> Segment {
    Segment::new(Point::new(x1, y1), Point::new(x2, y2), 0)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(future)
}

#[tokio::test]
async fn disjoint_segments_get_one_lift_between_them() {
    let params = PlotParameters {
        z_hop_threshold: 2.0,
        ..Default::default()
    };
    let segments = [seg(0.0, 0.0, 1.0, 0.0), seg(101.0, 0.0, 102.0, 0.0)];
    let toolpath = plan_toolpath(&segments, &params, &ProcessingToken::detached(None))
        .await
        .unwrap();

    let draws: Vec<usize> = toolpath
        .events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, ToolpathEvent::Draw { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(draws.len(), 2);

    let between = &toolpath.events[draws[0] + 1..draws[1]];
    let ups = between
        .iter()
        .filter(|e| matches!(e, ToolpathEvent::PenUp { .. }))
        .count();
    let downs = between
        .iter()
        .filter(|e| matches!(e, ToolpathEvent::PenDown { .. }))
        .count();
    assert_eq!((ups, downs), (1, 1));
}

/// Replays the event log and checks pen state for every motion.
fn check_pen_states(events: &[ToolpathEvent]) -> Result<usize, String> {
    let mut pen = PenState::Up;
    let mut transitions = 0;
    for (index, event) in events.iter().enumerate() {
        match event {
            ToolpathEvent::Draw { .. } if pen != PenState::Down => {
                return Err(format!("draw with pen up at event {}", index))
            }
            ToolpathEvent::Travel { .. } if pen != PenState::Up => {
                return Err(format!("travel with pen down at event {}", index))
            }
            ToolpathEvent::PenDown { .. } => {
                if pen == PenState::Down {
                    return Err(format!("pen lowered twice at event {}", index));
                }
                pen = PenState::Down;
                transitions += 1;
            }
            ToolpathEvent::PenUp { .. } => pen = PenState::Up,
            _ => {}
        }
    }
    if pen != PenState::Up {
        return Err("pen left down at end of job".to_string());
    }
    Ok(transitions)
}

proptest! {
    #[test]
    fn pen_state_matches_every_motion(
        coords in prop::collection::vec((0.0..100.0f64, 0.0..100.0f64, 0.0..100.0f64, 0.0..100.0f64), 0..40),
        threshold in 0.0..30.0f64,
    ) {
        let segments: Vec<Segment> = coords
            .iter()
            .map(|&(x1, y1, x2, y2)| seg(x1, y1, x2, y2))
            .collect();
        let params = PlotParameters {
            z_hop_threshold: threshold,
            ..Default::default()
        };
        let toolpath = block_on(plan_toolpath(&segments, &params, &ProcessingToken::detached(None)))
            .unwrap();

        let downs = toolpath
            .events
            .iter()
            .filter(|e| matches!(e, ToolpathEvent::PenDown { .. }))
            .count();
        let transitions = check_pen_states(&toolpath.events);
        prop_assert_eq!(transitions, Ok(downs));
        prop_assert!(downs <= segments.len());

        let draw: f64 = toolpath
            .events
            .iter()
            .filter(|e| matches!(e, ToolpathEvent::Draw { .. }))
            .map(ToolpathEvent::length)
            .sum();
        prop_assert!((draw - toolpath.draw_length).abs() < 1e-6);
    }
}
