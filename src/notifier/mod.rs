// src/notifier/mod.rs

//! Boundary to the OS-level change-notification primitive.
//!
//! The watcher only needs four things from a notifier:
//! - register a single path,
//! - close / release everything,
//! - a stream of raw events (absolute path + raw op bits),
//! - an independent stream of raw errors.
//!
//! [`native::NativeNotifier`] implements this on top of `notify`; tests use
//! [`mock::MockNotifier`] to emit synthetic events on demand.

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;

pub mod mock;
pub mod native;

pub use mock::MockNotifier;
pub use native::NativeNotifier;

/// Errors produced by a notifier backend.
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error(transparent)]
    Backend(#[from] notify::Error),

    #[error("notifier is closed")]
    Closed,

    #[error("{0}")]
    Rejected(String),
}

/// A raw notification as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    /// Raw op bits; unknown bits are dropped during normalization.
    pub bits: u32,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, bits: u32) -> Self {
        Self {
            path: path.into(),
            bits,
        }
    }
}

/// Receiving ends of a notifier's event and error channels.
#[derive(Debug)]
pub struct NotifierStreams {
    pub events: mpsc::UnboundedReceiver<RawEvent>,
    pub errors: mpsc::UnboundedReceiver<NotifierError>,
}

/// Sending ends matching [`NotifierStreams`], held by the backend.
#[derive(Debug, Clone)]
pub struct NotifierSenders {
    pub events: mpsc::UnboundedSender<RawEvent>,
    pub errors: mpsc::UnboundedSender<NotifierError>,
}

/// Create a connected sender/stream pair.
pub fn channel() -> (NotifierSenders, NotifierStreams) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::unbounded_channel();
    (
        NotifierSenders {
            events: event_tx,
            errors: error_tx,
        },
        NotifierStreams {
            events: event_rx,
            errors: error_rx,
        },
    )
}

/// Narrow interface the watcher requires from a change-notification backend.
pub trait Notifier: Send + Sync + Debug {
    /// Start observing a single path (non-recursively).
    fn register(&self, path: &Path) -> Result<(), NotifierError>;

    /// Release all backend resources. Events stop flowing afterwards.
    fn close(&self) -> Result<(), NotifierError>;
}
