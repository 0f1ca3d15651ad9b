// src/watch/watch_set.rs

//! Recursive registration of a directory tree with the notifier.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::{FswatchError, Result};
use crate::fs::{EntryKind, FileSystem};
use crate::notifier::Notifier;

/// Keeps the notifier aware of every directory under the roots it was given.
///
/// Files are observed through their parent directory and are never
/// registered on their own. Symlinked directories are not followed.
#[derive(Debug, Clone)]
pub struct WatchSet {
    notifier: Arc<dyn Notifier>,
    fs: Arc<dyn FileSystem>,
}

impl WatchSet {
    pub fn new(notifier: Arc<dyn Notifier>, fs: Arc<dyn FileSystem>) -> Self {
        Self { notifier, fs }
    }

    /// Register `path` and, if it is a directory, every directory below it.
    ///
    /// Registration is depth-first and stops at the first failure. Paths that
    /// were registered before the failure stay registered.
    pub fn add_root(&self, path: &Path) -> Result<()> {
        let kind = self
            .fs
            .stat(path)
            .map_err(|source| FswatchError::PathUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        self.register(path)?;

        if kind == EntryKind::Dir {
            self.register_descendants(path)?;
        }

        debug!(?path, "watch root registered");
        Ok(())
    }

    fn register_descendants(&self, dir: &Path) -> Result<()> {
        let entries = self
            .fs
            .read_dir(dir)
            .map_err(|source| FswatchError::PathUnavailable {
                path: dir.to_path_buf(),
                source,
            })?;

        for (child, kind) in entries {
            if kind == EntryKind::Dir {
                self.register(&child)?;
                self.register_descendants(&child)?;
            }
        }
        Ok(())
    }

    fn register(&self, path: &Path) -> Result<()> {
        trace!(?path, "registering path");
        self.notifier
            .register(path)
            .map_err(|source| FswatchError::WatchRegistrationFailed {
                path: path.to_path_buf(),
                source,
            })
    }
}
