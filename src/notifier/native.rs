// src/notifier/native.rs

use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use super::{channel, Notifier, NotifierError, NotifierStreams, RawEvent};
use crate::op::Op;

/// Notifier backed by the platform watcher from the `notify` crate.
///
/// Paths are registered non-recursively; the watch set takes care of
/// registering every directory in the tree.
pub struct NativeNotifier {
    inner: Mutex<Option<RecommendedWatcher>>,
}

impl fmt::Debug for NativeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeNotifier").finish_non_exhaustive()
    }
}

impl NativeNotifier {
    /// Build the platform watcher and return it with its streams.
    pub fn new() -> Result<(Self, NotifierStreams), NotifierError> {
        let (senders, streams) = channel();

        // Closure called synchronously by notify whenever an event arrives.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for raw in translate(event) {
                        if senders.events.send(raw).is_err() {
                            // Receiver is gone; the watch loop has exited.
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = senders.errors.send(NotifierError::Backend(err));
                }
            },
            Config::default(),
        )?;

        let notifier = Self {
            inner: Mutex::new(Some(watcher)),
        };
        Ok((notifier, streams))
    }
}

impl Notifier for NativeNotifier {
    fn register(&self, path: &Path) -> Result<(), NotifierError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| NotifierError::Rejected("notifier mutex poisoned".to_string()))?;

        match guard.as_mut() {
            Some(watcher) => {
                watcher.watch(path, RecursiveMode::NonRecursive)?;
                debug!(?path, "registered path with native notifier");
                Ok(())
            }
            None => Err(NotifierError::Closed),
        }
    }

    fn close(&self) -> Result<(), NotifierError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| NotifierError::Rejected("notifier mutex poisoned".to_string()))?;

        // Dropping the backend unregisters everything and closes the streams.
        if guard.take().is_some() {
            debug!("native notifier closed");
        }
        Ok(())
    }
}

/// Map a `notify` event onto one raw event per affected path.
fn translate(event: notify::Event) -> Vec<RawEvent> {
    let op = match event.kind {
        EventKind::Create(_) => Op::CREATE,
        EventKind::Remove(_) => Op::REMOVE,
        EventKind::Modify(ModifyKind::Metadata(_)) => Op::CHMOD,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Op::CREATE,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths[0] is the old name, paths[1] the new one.
            return event
                .paths
                .into_iter()
                .enumerate()
                .map(|(idx, path)| {
                    let op = if idx == 0 { Op::RENAME } else { Op::CREATE };
                    RawEvent::new(path, op.bits())
                })
                .collect();
        }
        EventKind::Modify(ModifyKind::Name(_)) => Op::RENAME,
        EventKind::Modify(_) => Op::WRITE,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Op::empty(),
    };

    if op.is_empty() {
        return Vec::new();
    }

    event
        .paths
        .into_iter()
        .map(|path| RawEvent::new(path, op.bits()))
        .collect()
}
