mod common;
use crate::common::{settle, Harness};

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use fswatch::Op;
use fswatch_test_utils::{init_tracing, RecordingHandler};

const DELAY: Duration = Duration::from_millis(200);

#[tokio::test(start_paused = true)]
async fn burst_of_writes_runs_handler_once_after_the_delay() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("build", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    let first = Instant::now();
    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(Duration::from_millis(20)).await;
    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(Duration::from_millis(20)).await;
    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(Duration::from_millis(500)).await;

    let runs = probe.run_times();
    assert_eq!(runs.len(), 1, "burst should collapse into a single run");
    let elapsed = runs[0] - first;
    assert!(elapsed >= DELAY, "ran too early: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(250), "ran too late: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn triggers_spaced_beyond_the_delay_run_separately() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("build", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(Duration::from_millis(300)).await;
    h.notifier.emit("/w/a.txt", Op::CREATE);
    sleep(Duration::from_millis(300)).await;

    let runs = probe.run_times();
    assert_eq!(runs.len(), 2);
    assert!(runs[1] - runs[0] >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn each_handler_debounces_with_its_own_delay() {
    init_tracing();
    let h = Harness::new();
    let fast = RecordingHandler::new("fast", Duration::from_millis(50));
    let slow = RecordingHandler::new("slow", Duration::from_millis(400));
    let fast_probe = fast.probe();
    let slow_probe = slow.probe();
    h.watcher.handle(fast);
    h.watcher.handle(slow);
    h.watcher.start(&CancellationToken::new());

    let first = Instant::now();
    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(Duration::from_millis(100)).await;
    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(Duration::from_millis(600)).await;

    assert_eq!(fast_probe.runs(), 2);
    let slow_runs = slow_probe.run_times();
    assert_eq!(slow_runs.len(), 1);
    assert!(slow_runs[0] - first >= Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn trigger_after_a_run_started_schedules_one_more_run() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("build", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(DELAY).await;
    settle().await;
    assert_eq!(probe.runs(), 1);

    // Pending is cleared when the run starts.
    h.notifier.emit("/w/a.txt", Op::WRITE);
    h.notifier.emit("/w/a.txt", Op::WRITE);
    sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 2);
}
