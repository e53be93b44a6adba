use plotkit_core::{ProcessingError, ProcessingScheduler, ProcessingToken, ProgressUpdate, RunOutcome};
use std::sync::Arc;

/// Work loop that yields at every checkpoint, like a pipeline stage.
async fn count_to(token: ProcessingToken, limit: usize) -> Result<usize, ProcessingError> {
    let mut total = 0;
    for i in 0..limit {
        total += 1;
        token.checkpoint(i + 1).await?;
    }
    token.check()?;
    Ok(total)
}

#[tokio::test]
async fn test_new_run_supersedes_running_one() {
    let scheduler: Arc<ProcessingScheduler<usize>> = Arc::new(ProcessingScheduler::new());

    let slow = scheduler.run(|token| count_to(token, 64 * 1000));
    let fast = async {
        // Let the slow run start and reach its first suspension point.
        tokio::task::yield_now().await;
        scheduler.run(|token| count_to(token, 10)).await
    };

    let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

    assert!(matches!(slow_outcome, RunOutcome::Superseded));
    assert!(fast_outcome.is_completed());
    assert_eq!(scheduler.latest().as_deref(), Some(&10));
}

#[tokio::test]
async fn test_cancelled_run_leaves_previous_result_untouched() {
    let scheduler: ProcessingScheduler<usize> = ProcessingScheduler::new();
    scheduler.run(|token| count_to(token, 100)).await;
    let before = scheduler.latest().unwrap();

    let outcome = scheduler
        .run(|token| async move {
            token.cancel();
            count_to(token, 1000).await
        })
        .await;

    assert!(matches!(outcome, RunOutcome::Superseded));
    let after = scheduler.latest().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn test_progress_observer_sees_reports() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let scheduler: ProcessingScheduler<()> =
        ProcessingScheduler::new().with_progress_observer(Arc::new(move |update: &ProgressUpdate| {
            sink.lock().push(update.message.clone());
        }));

    let outcome = scheduler
        .run(|token| async move {
            token.report_progress(50.0, "halfway");
            token.report_progress(100.0, "done");
            Ok(())
        })
        .await;

    assert!(outcome.is_completed());
    assert_eq!(*seen.lock(), vec!["halfway".to_string(), "done".to_string()]);
}
