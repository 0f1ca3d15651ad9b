#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fswatch::fs::mock::MockFileSystem;
use fswatch::notifier::MockNotifier;
use fswatch::{FswatchError, Watcher};

/// A watcher on `/w` wired to in-memory collaborators, with every reported
/// error captured.
pub struct Harness {
    pub watcher: Watcher,
    pub notifier: MockNotifier,
    pub fs: MockFileSystem,
    pub errors: Arc<Mutex<Vec<FswatchError>>>,
}

impl Harness {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        fs.add_file("/w/a.txt");
        Self::with_fs(fs)
    }

    pub fn with_fs(fs: MockFileSystem) -> Self {
        Self::with_root("/w", fs)
    }

    pub fn with_root(root: &str, fs: MockFileSystem) -> Self {
        let (notifier, streams) = MockNotifier::new();
        let watcher = Watcher::with_parts(
            root,
            Arc::new(notifier.clone()),
            streams,
            Arc::new(fs.clone()),
        );

        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        watcher.handle_error(move |err| sink.lock().unwrap().push(err));

        Self {
            watcher,
            notifier,
            fs,
            errors,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.to_string())
            .collect()
    }
}

/// Let the watch loop drain whatever has been emitted so far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
