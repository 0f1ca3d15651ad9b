// src/engine/reporter.rs

//! Replaceable error sink shared by the watcher and its runners.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::error;

use crate::errors::FswatchError;

/// Callback receiving every failure discovered after startup.
pub type ErrorCallback = Arc<dyn Fn(FswatchError) + Send + Sync>;

/// Cloneable handle to the current error callback.
///
/// All clones observe a replacement made through any of them, so runners
/// created before `handle_error` still report to the new sink.
#[derive(Clone)]
pub struct ErrorReporter {
    callback: Arc<RwLock<ErrorCallback>>,
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter").finish_non_exhaustive()
    }
}

impl Default for ErrorReporter {
    /// Log-and-continue.
    fn default() -> Self {
        Self::new(|err| error!(error = %err, "watcher error"))
    }
}

impl ErrorReporter {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(FswatchError) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(RwLock::new(Arc::new(callback))),
        }
    }

    pub fn replace<F>(&self, callback: F)
    where
        F: Fn(FswatchError) + Send + Sync + 'static,
    {
        let mut guard = self
            .callback
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(callback);
    }

    pub fn report(&self, err: FswatchError) {
        // Clone out of the lock so the callback may itself call `replace`.
        let callback = {
            let guard = self
                .callback
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(&*guard)
        };
        callback(err);
    }
}
