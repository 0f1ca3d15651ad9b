// src/engine/watcher.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::registry::HandlerRegistry;
use crate::engine::reporter::ErrorReporter;
use crate::errors::{FswatchError, Result};
use crate::event::Event;
use crate::exec::handler::Handler;
use crate::exec::runner::Runner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::notifier::{NativeNotifier, Notifier, NotifierStreams, RawEvent};
use crate::op::Op;
use crate::watch::path_utils::{absolute_path, relative_path};
use crate::watch::watch_set::WatchSet;

/// Observable lifecycle of a [`Watcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Constructed, not watching yet.
    Created,
    /// Watch loop running.
    Started,
    /// Terminal: notifier closed, handlers stopped.
    Stopped,
}

enum Lifecycle {
    Created,
    Started { cancel: CancellationToken },
    Stopped,
}

impl Lifecycle {
    fn state(&self) -> WatcherState {
        match self {
            Lifecycle::Created => WatcherState::Created,
            Lifecycle::Started { .. } => WatcherState::Started,
            Lifecycle::Stopped => WatcherState::Stopped,
        }
    }
}

/// State shared between the watcher handle and its watch loop.
struct Shared {
    root: PathBuf,
    notifier: Arc<dyn Notifier>,
    fs: Arc<dyn FileSystem>,
    watch_set: WatchSet,
    registry: HandlerRegistry,
    reporter: ErrorReporter,
}

/// Watches a directory tree and dispatches matching events to handlers.
///
/// Lifecycle: `Created` → [`start`](Watcher::start) → `Started` →
/// [`stop`](Watcher::stop) → `Stopped`. There is no way back from
/// `Stopped`. Dropping a started watcher cancels its watch loop.
pub struct Watcher {
    shared: Arc<Shared>,
    streams: Mutex<Option<NotifierStreams>>,
    /// Also serializes handler registration against `stop`.
    lifecycle: Mutex<Lifecycle>,
    loop_task: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("root", &self.shared.root)
            .field("state", &self.state())
            .field("handlers", &self.shared.registry.len())
            .finish_non_exhaustive()
    }
}

impl Watcher {
    /// Build an inert watcher on top of the platform notifier.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let (notifier, streams) = NativeNotifier::new()?;
        Ok(Self::with_parts(
            root,
            Arc::new(notifier),
            streams,
            Arc::new(RealFileSystem),
        ))
    }

    /// Build an inert watcher from explicit collaborators.
    ///
    /// A relative `root` is resolved against the current directory here, once.
    pub fn with_parts(
        root: impl Into<PathBuf>,
        notifier: Arc<dyn Notifier>,
        streams: NotifierStreams,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let watch_set = WatchSet::new(Arc::clone(&notifier), Arc::clone(&fs));
        Self {
            shared: Arc::new(Shared {
                root: absolute_path(&root.into()),
                notifier,
                fs,
                watch_set,
                registry: HandlerRegistry::new(),
                reporter: ErrorReporter::default(),
            }),
            streams: Mutex::new(Some(streams)),
            lifecycle: Mutex::new(Lifecycle::Created),
            loop_task: Mutex::new(None),
        }
    }

    /// Build a watcher and start it immediately with its own cancellation
    /// scope. Must be called from within a Tokio runtime.
    pub fn watch(root: impl Into<PathBuf>) -> Result<Self> {
        let watcher = Self::new(root)?;
        watcher.start(&CancellationToken::new());
        Ok(watcher)
    }

    /// Absolute watch root.
    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    pub fn state(&self) -> WatcherState {
        self.lock_lifecycle().state()
    }

    /// Register an additional root (recursively).
    pub fn add(&self, path: impl AsRef<Path>) -> Result<()> {
        self.shared.watch_set.add_root(&absolute_path(path.as_ref()))
    }

    /// Register a handler. Returns `false` if one with the same name exists.
    pub fn handle<H: Handler>(&self, handler: H) -> bool {
        self.handle_shared(Arc::new(handler))
    }

    pub fn handle_shared(&self, handler: Arc<dyn Handler>) -> bool {
        let _guard = self.lock_lifecycle();
        self.shared.registry.register(handler, &self.shared.reporter)
    }

    /// Returns true if any registered runner satisfies `predicate`.
    pub fn find<P>(&self, predicate: P) -> bool
    where
        P: Fn(&Runner) -> bool,
    {
        self.shared.registry.find(predicate)
    }

    pub fn handler_count(&self) -> usize {
        self.shared.registry.len()
    }

    /// Replace the error sink. Runners registered earlier report to the new
    /// sink as well.
    pub fn handle_error<F>(&self, callback: F)
    where
        F: Fn(FswatchError) + Send + Sync + 'static,
    {
        self.shared.reporter.replace(callback);
    }

    /// Register the root and spawn the watch loop.
    ///
    /// Non-blocking. A failure to register the root is reported through the
    /// error callback and leaves the watcher inert. The loop runs until
    /// `stop`, until `parent` is cancelled, or until the notifier closes its
    /// streams. Must be called from within a Tokio runtime.
    pub fn start(&self, parent: &CancellationToken) {
        let mut lifecycle = self.lock_lifecycle();
        if !matches!(*lifecycle, Lifecycle::Created) {
            warn!(state = ?lifecycle.state(), "watcher cannot be started again; ignoring");
            return;
        }

        if let Err(err) = self.shared.watch_set.add_root(&self.shared.root) {
            drop(lifecycle);
            self.shared.reporter.report(err);
            return;
        }

        let streams = self
            .streams
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(streams) = streams else {
            warn!("notifier streams already consumed; watcher stays inert");
            return;
        };

        let cancel = parent.child_token();
        let task = tokio::spawn(watch_loop(
            Arc::clone(&self.shared),
            streams,
            cancel.clone(),
        ));
        *self
            .loop_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(task);
        *lifecycle = Lifecycle::Started { cancel };

        info!(root = ?self.shared.root, "watcher started");
    }

    /// Cancel the watch loop, close the notifier and stop every handler.
    ///
    /// Each failure is reported separately; one failing step does not prevent
    /// the others. Calling `stop` again is a no-op.
    pub fn stop(&self) {
        let mut lifecycle = self.lock_lifecycle();
        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Stopped => {
                debug!("watcher already stopped");
                return;
            }
            Lifecycle::Started { cancel } => cancel.cancel(),
            Lifecycle::Created => {}
        }

        let runners = self.shared.registry.snapshot();
        // Handler stop actions and error callbacks run outside the lock so
        // they may use the watcher.
        drop(lifecycle);

        if let Err(err) = self.shared.notifier.close() {
            self.shared
                .reporter
                .report(FswatchError::NotifierCloseFailed(err));
        }
        for runner in runners {
            if let Err(err) = runner.stop() {
                self.shared.reporter.report(err);
            }
        }
        info!(root = ?self.shared.root, "watcher stopped");
    }

    /// Wait until the watch loop has exited. Returns immediately if the
    /// watcher was never started or the loop was already awaited.
    pub async fn wait(&self) {
        let task = self
            .loop_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(error = %err, "watch loop terminated abnormally");
            }
        }
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Lifecycle::Started { cancel } = lifecycle {
            cancel.cancel();
        }
    }
}

/// Single sequential consumer of raw events and errors.
async fn watch_loop(shared: Arc<Shared>, mut streams: NotifierStreams, cancel: CancellationToken) {
    info!(root = ?shared.root, "watch loop started");

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("watch loop cancelled");
                break;
            }
            Some(raw) = streams.events.recv() => shared.on_event(raw),
            Some(err) = streams.errors.recv() => {
                shared.reporter.report(FswatchError::Notifier(err));
            }
            else => {
                debug!("notifier streams closed");
                break;
            }
        }
    }

    info!(root = ?shared.root, "watch loop exited");
}

impl Shared {
    fn on_event(&self, raw: RawEvent) {
        let op = Op::from_bits_truncate(raw.bits);
        let name = relative_path(self.fs.as_ref(), &self.root, &raw.path);
        let event = Event::new(name, op);
        debug!(%event, "received event");

        // New directories must be registered before events inside them can
        // be observed.
        if op.is(&[Op::CREATE]) && self.fs.is_dir(&raw.path) {
            info!(path = ?raw.path, "watching new directory");
            if let Err(err) = self.watch_set.add_root(&raw.path) {
                self.reporter.report(FswatchError::WatchExtendFailed {
                    path: raw.path.clone(),
                    source: Box::new(err),
                });
            }
        }

        if op.is(&Op::DISPATCHABLE) {
            self.dispatch(&event);
        }
    }

    fn dispatch(&self, event: &Event) {
        for runner in self.registry.snapshot() {
            if runner.matches(event) {
                info!(handler = %runner.name(), %event, "event matched handler");
                runner.execute();
            }
        }
    }
}
