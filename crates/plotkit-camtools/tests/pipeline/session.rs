use parking_lot::Mutex;
use plotkit_camtools::{PlotParameters, PlotSession, Stage};
use plotkit_core::{ProgressUpdate, RunOutcome};
use std::sync::Arc;
use std::time::Duration;

const SMALL: &str = r#"<svg><rect x="0" y="0" width="10" height="10"/></svg>"#;

/// A long path whose default sampling yields a few thousand segments.
fn large_drawing() -> String {
    let mut d = String::from("M 0 0");
    for i in 0..40 {
        d.push_str(&format!(" L {} {}", (i % 2) * 40, i + 1));
    }
    format!(r#"<svg><path d="{}"/></svg>"#, d)
}

#[tokio::test]
async fn cancel_during_optimization_keeps_previous_output() {
    let session = PlotSession::new(PlotParameters::default());
    assert!(session.submit(SMALL).await.is_completed());
    let before = session.latest().unwrap();
    let snapshot = (
        before.gcode.clone(),
        before.preview_svg.clone(),
        before.statistics.clone(),
    );

    let markup = large_drawing();
    let watcher = async {
        for _ in 0..100_000 {
            if let Some(progress) = session.progress() {
                if progress.message == Stage::Optimize.label() && progress.percent > 50.0 {
                    session.cancel();
                    return true;
                }
            }
            tokio::task::yield_now().await;
        }
        false
    };

    let (outcome, cancelled) = tokio::join!(session.submit(&markup), watcher);
    assert!(cancelled, "optimization stage was never observed");
    assert!(matches!(outcome, RunOutcome::Superseded));

    let after = session.latest().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.gcode, snapshot.0);
    assert_eq!(after.preview_svg, snapshot.1);
    assert_eq!(after.statistics, snapshot.2);
}

#[tokio::test]
async fn newer_submission_supersedes_older() {
    let session = PlotSession::new(PlotParameters::default());
    let markup = large_drawing();

    let second = async {
        tokio::task::yield_now().await;
        session.submit(SMALL).await
    };
    let (first, second) = tokio::join!(session.submit(&markup), second);

    assert!(matches!(first, RunOutcome::Superseded));
    assert!(second.is_completed());
    assert_eq!(session.latest().unwrap().statistics.stroke_count, 1);
}

#[tokio::test]
async fn timeout_is_reported_and_previous_output_kept() {
    let session = PlotSession::new(PlotParameters::default())
        .with_timeout(Some(Duration::from_micros(1)));
    let outcome = session.submit(&large_drawing()).await;
    assert!(matches!(outcome, RunOutcome::TimedOut { .. }));
    assert_eq!(
        outcome.user_message().as_deref(),
        Some("Processing took too long. Try reducing detail.")
    );
    assert!(session.latest().is_none());
}

#[tokio::test]
async fn debounced_burst_runs_once() {
    let session =
        PlotSession::new(PlotParameters::default()).with_debounce(Duration::from_millis(20));
    let markup = large_drawing();
    let (a, b, c) = tokio::join!(
        session.submit_debounced(SMALL),
        session.submit_debounced(SMALL),
        session.submit_debounced(&markup),
    );
    assert!(matches!(a, RunOutcome::Superseded));
    assert!(matches!(b, RunOutcome::Superseded));
    assert!(c.is_completed());
    assert!(session.latest().unwrap().statistics.segment_count > 4);
}

#[tokio::test]
async fn progress_is_reported_through_every_stage() {
    let seen: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let session = PlotSession::new(PlotParameters::default()).with_progress_observer(Arc::new(
        move |update: &ProgressUpdate| sink.lock().push(update.clone()),
    ));

    assert!(session.submit(&large_drawing()).await.is_completed());

    let seen = seen.lock();
    for stage in [
        Stage::Extract,
        Stage::Normalize,
        Stage::Segment,
        Stage::Optimize,
        Stage::Generate,
    ] {
        assert!(
            seen.iter().any(|u| u.message == stage.label()),
            "no progress for {:?}",
            stage
        );
    }
    assert_eq!(seen.last().map(|u| u.percent), Some(100.0));
    assert!(seen.windows(2).all(|w| w[0].percent <= w[1].percent));
}

#[tokio::test]
async fn parameter_changes_apply_to_next_submission() {
    let session = PlotSession::new(PlotParameters::default());
    session.submit(SMALL).await;
    let first = session.latest().unwrap().statistics.draw_length;

    let mut params = session.parameters();
    params.units_per_physical_unit = 2.0;
    session.set_parameters(params);
    session.submit(SMALL).await;
    let second = session.latest().unwrap().statistics.draw_length;

    assert!((second - 2.0 * first).abs() < 1e-9);
}
