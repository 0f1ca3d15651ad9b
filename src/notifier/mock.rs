// src/notifier/mock.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{channel, Notifier, NotifierError, NotifierSenders, NotifierStreams, RawEvent};
use crate::op::Op;

#[derive(Debug, Default)]
struct MockState {
    registered: Vec<PathBuf>,
    rejected: HashSet<PathBuf>,
    close_error: Option<String>,
    close_calls: usize,
    closed: bool,
}

/// Scriptable in-memory notifier.
///
/// Behaves like a non-recursive OS notifier: [`MockNotifier::emit`] only
/// delivers an event when the path itself or its parent directory has been
/// registered, so tests can observe whether the watch set kept up with the
/// tree.
#[derive(Debug, Clone)]
pub struct MockNotifier {
    state: Arc<Mutex<MockState>>,
    senders: NotifierSenders,
}

impl MockNotifier {
    pub fn new() -> (Self, NotifierStreams) {
        let (senders, streams) = channel();
        let notifier = Self {
            state: Arc::new(Mutex::new(MockState::default())),
            senders,
        };
        (notifier, streams)
    }

    /// Deliver a raw event if the path is observable.
    ///
    /// Returns `true` if the event was sent.
    pub fn emit(&self, path: impl AsRef<Path>, op: Op) -> bool {
        let path = path.as_ref();
        if !self.observes(path) {
            return false;
        }
        self.senders
            .events
            .send(RawEvent::new(path, op.bits()))
            .is_ok()
    }

    /// Deliver a raw event unconditionally, with arbitrary bits.
    pub fn emit_raw(&self, raw: RawEvent) -> bool {
        self.senders.events.send(raw).is_ok()
    }

    /// Deliver a raw backend error.
    pub fn emit_error(&self, message: impl Into<String>) -> bool {
        self.senders
            .errors
            .send(NotifierError::Rejected(message.into()))
            .is_ok()
    }

    /// Make future `register` calls for this path fail.
    pub fn reject(&self, path: impl Into<PathBuf>) {
        self.state.lock().unwrap().rejected.insert(path.into());
    }

    /// Make `close` fail with the given message.
    pub fn fail_close(&self, message: impl Into<String>) {
        self.state.lock().unwrap().close_error = Some(message.into());
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().registered.clone()
    }

    pub fn is_registered(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.state
            .lock()
            .unwrap()
            .registered
            .iter()
            .any(|p| p == path)
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn observes(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        if state.closed {
            return false;
        }
        state
            .registered
            .iter()
            .any(|p| p == path || path.parent() == Some(p.as_path()))
    }
}

impl Notifier for MockNotifier {
    fn register(&self, path: &Path) -> Result<(), NotifierError> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(NotifierError::Closed);
        }
        if state.rejected.contains(path) {
            return Err(NotifierError::Rejected(format!(
                "registration rejected for {:?}",
                path
            )));
        }
        if !state.registered.iter().any(|p| p == path) {
            state.registered.push(path.to_path_buf());
        }
        Ok(())
    }

    fn close(&self) -> Result<(), NotifierError> {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;
        state.closed = true;
        match &state.close_error {
            Some(msg) => Err(NotifierError::Rejected(msg.clone())),
            None => Ok(()),
        }
    }
}
