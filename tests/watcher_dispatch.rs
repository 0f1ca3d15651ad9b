mod common;
use crate::common::{settle, Harness};

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use fswatch::notifier::RawEvent;
use fswatch::{Event, FnHandler, FswatchError, Op, WatcherState};
use fswatch_test_utils::{init_tracing, wait_until, RecordingHandler};

const DELAY: Duration = Duration::from_millis(100);

#[tokio::test(start_paused = true)]
async fn start_registers_root_and_dispatches_relative_events() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("all", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);

    h.watcher.start(&CancellationToken::new());
    assert_eq!(h.watcher.state(), WatcherState::Started);
    assert!(h.notifier.is_registered("/w"));

    assert!(h.notifier.emit("/w/a.txt", Op::WRITE));
    settle().await;

    assert_eq!(
        probe.matched_events(),
        vec![Event::new("a.txt", Op::WRITE)]
    );

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 1);
    assert_eq!(h.error_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn new_subdirectory_is_watched_before_the_next_event() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("sub", DELAY).matching(|e| e.name().starts_with("sub"));
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    h.fs.add_dir("/w/sub");
    assert!(h.notifier.emit("/w/sub", Op::CREATE));
    wait_until("sub directory registration", || h.notifier.is_registered("/w/sub")).await;

    h.fs.add_file("/w/sub/b.txt");
    assert!(
        h.notifier.emit("/w/sub/b.txt", Op::CREATE),
        "file inside new directory should be observable"
    );
    settle().await;

    assert!(probe
        .matched_events()
        .contains(&Event::new("sub/b.txt", Op::CREATE)));
}

#[tokio::test(start_paused = true)]
async fn nested_tree_created_at_once_is_registered_recursively() {
    init_tracing();
    let h = Harness::new();
    h.watcher.start(&CancellationToken::new());

    h.fs.add_dir("/w/x/y/z");
    h.notifier.emit("/w/x", Op::CREATE);
    wait_until("nested registration", || h.notifier.is_registered("/w/x/y/z")).await;

    assert!(h.notifier.is_registered("/w/x/y"));
}

#[tokio::test(start_paused = true)]
async fn directory_expansion_failure_is_reported_and_dispatch_continues() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("all", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    h.fs.add_dir("/w/locked");
    h.notifier.reject("/w/locked");
    h.notifier.emit("/w/locked", Op::CREATE);
    settle().await;

    {
        let errors = h.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            FswatchError::WatchExtendFailed { path, source } => {
                assert_eq!(path, Path::new("/w/locked"));
                assert!(matches!(**source, FswatchError::WatchRegistrationFailed { .. }));
            }
            other => panic!("expected WatchExtendFailed, got {other:?}"),
        }
    }
    assert_eq!(probe.matched_events(), vec![Event::new("locked", Op::CREATE)]);

    // The loop is still alive.
    h.notifier.emit("/w/a.txt", Op::WRITE);
    settle().await;
    assert_eq!(probe.matched_events().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn raw_notifier_errors_reach_the_callback() {
    init_tracing();
    let h = Harness::new();
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit_error("event queue overflow");
    settle().await;

    let errors = h.errors.lock().unwrap();
    assert!(matches!(errors.as_slice(), [FswatchError::Notifier(_)]));
    assert!(errors[0].to_string().contains("event queue overflow"));
}

#[tokio::test(start_paused = true)]
async fn chmod_and_unknown_bits_are_not_dispatched() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("all", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit("/w/a.txt", Op::CHMOD);
    h.notifier.emit_raw(RawEvent::new("/w/a.txt", 1 << 20));
    settle().await;
    tokio::time::sleep(DELAY * 2).await;

    assert!(probe.matched_events().is_empty());
    assert_eq!(probe.runs(), 0);

    // Unknown bits are dropped but known ones survive.
    h.notifier
        .emit_raw(RawEvent::new("/w/a.txt", (1 << 20) | Op::WRITE.bits()));
    settle().await;
    assert_eq!(probe.matched_events(), vec![Event::new("a.txt", Op::WRITE)]);
}

#[tokio::test(start_paused = true)]
async fn handlers_are_matched_in_registration_order() {
    init_tracing();
    let h = Harness::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        let handler = FnHandler::new(name, DELAY, || Ok(())).with_matcher(move |_| {
            order.lock().unwrap().push(name);
            true
        });
        h.watcher.handle(handler);
    }
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit("/w/a.txt", Op::WRITE);
    settle().await;

    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test(start_paused = true)]
async fn duplicate_handler_names_register_once() {
    init_tracing();
    let h = Harness::new();

    let first = RecordingHandler::new("build", DELAY);
    let first_probe = first.probe();
    let second = RecordingHandler::new("build", DELAY);
    let second_probe = second.probe();

    assert!(h.watcher.handle(first));
    assert!(!h.watcher.handle(second));
    assert_eq!(h.watcher.handler_count(), 1);
    assert!(h.watcher.find(|r| r.name() == "build"));
    assert!(!h.watcher.find(|r| r.name() == "deploy"));

    h.watcher.start(&CancellationToken::new());
    h.notifier.emit("/w/a.txt", Op::WRITE);
    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(first_probe.runs(), 1);
    assert_eq!(second_probe.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn handlers_registered_after_start_receive_events() {
    init_tracing();
    let h = Harness::new();
    h.watcher.start(&CancellationToken::new());

    let late = RecordingHandler::new("late", DELAY);
    let probe = late.probe();
    h.watcher.handle(late);

    h.notifier.emit("/w/a.txt", Op::REMOVE);
    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(probe.runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_and_panicking_handlers_do_not_affect_others() {
    init_tracing();
    let h = Harness::new();

    let failing = RecordingHandler::new("failing", DELAY).failing();
    let panicking = RecordingHandler::new("panicking", DELAY).panicking();
    let healthy = RecordingHandler::new("healthy", DELAY);
    let failing_probe = failing.probe();
    let healthy_probe = healthy.probe();
    h.watcher.handle(failing);
    h.watcher.handle(panicking);
    h.watcher.handle(healthy);
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit("/w/a.txt", Op::WRITE);
    tokio::time::sleep(DELAY * 2).await;
    h.notifier.emit("/w/a.txt", Op::WRITE);
    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(healthy_probe.runs(), 2);
    assert_eq!(failing_probe.runs(), 2);
    assert_eq!(h.watcher.state(), WatcherState::Started);

    let errors = h.errors.lock().unwrap();
    assert_eq!(errors.len(), 4);
    assert!(errors
        .iter()
        .all(|e| matches!(e, FswatchError::HandlerRunFailed { .. })));
    assert_eq!(
        errors
            .iter()
            .filter(|e| e.to_string().contains("panicked"))
            .count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn missing_root_leaves_watcher_inert() {
    init_tracing();
    let h = Harness::with_fs(fswatch::fs::mock::MockFileSystem::new());
    let handler = RecordingHandler::new("all", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);

    h.watcher.start(&CancellationToken::new());

    assert_eq!(h.watcher.state(), WatcherState::Created);
    assert!(matches!(
        h.errors.lock().unwrap().as_slice(),
        [FswatchError::PathUnavailable { .. }]
    ));
    assert!(!h.notifier.emit("/w/a.txt", Op::WRITE));
    assert!(h.notifier.emit_raw(RawEvent::new("/w/a.txt", Op::WRITE.bits())));
    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn add_registers_extra_roots_and_reports_missing_paths() {
    init_tracing();
    let h = Harness::new();
    h.fs.add_dir("/other/nested");

    h.watcher.add("/other").unwrap();
    assert!(h.notifier.is_registered("/other/nested"));

    let err = h.watcher.add("/missing").unwrap_err();
    assert!(matches!(err, FswatchError::PathUnavailable { .. }));
}

#[tokio::test(start_paused = true)]
async fn events_outside_root_keep_absolute_names() {
    init_tracing();
    let h = Harness::new();
    h.fs.add_dir("/other");
    h.watcher.add("/other").unwrap();

    let handler = RecordingHandler::new("all", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());

    h.notifier.emit("/other/c.txt", Op::CREATE);
    settle().await;

    assert_eq!(
        probe.matched_events(),
        vec![Event::new("/other/c.txt", Op::CREATE)]
    );
}

#[tokio::test(start_paused = true)]
async fn parent_cancellation_ends_the_loop() {
    init_tracing();
    let h = Harness::new();
    let handler = RecordingHandler::new("all", DELAY);
    let probe = handler.probe();
    h.watcher.handle(handler);

    let parent = CancellationToken::new();
    h.watcher.start(&parent);
    parent.cancel();
    fswatch_test_utils::with_timeout(h.watcher.wait()).await;

    h.notifier.emit("/w/a.txt", Op::WRITE);
    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn relative_root_keeps_relative_names_for_removed_files() {
    init_tracing();
    let cwd = std::env::current_dir().unwrap();
    let fs = fswatch::fs::mock::MockFileSystem::new();
    fs.add_file(cwd.join("src/lib.rs"));

    let h = Harness::with_root(".", fs);
    assert_eq!(h.watcher.root(), cwd.as_path());

    let handler = RecordingHandler::new("rust", DELAY).matching(|e| e.name_str().starts_with("src/"));
    let probe = handler.probe();
    h.watcher.handle(handler);
    h.watcher.start(&CancellationToken::new());
    assert!(h.notifier.is_registered(cwd.join("src")));

    // The file is already gone, so canonicalizing it cannot help.
    assert!(h.notifier.emit(cwd.join("src/gone.rs"), Op::REMOVE));
    settle().await;

    assert_eq!(
        probe.matched_events(),
        vec![Event::new("src/gone.rs", Op::REMOVE)]
    );
    assert_eq!(h.error_count(), 0);
}
