// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

use crate::fs::FileSystem;

/// Express `path` relative to `root`.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
/// - Otherwise the original path is returned unchanged.
pub fn relative_path(fs: &dyn FileSystem, root: &Path, path: &Path) -> PathBuf {
    // Fast path: event path already starts with our root.
    if let Ok(rel) = path.strip_prefix(root) {
        return rel.to_path_buf();
    }

    // Different absolute prefixes may point at the same directory
    // (notably /private/var vs /var on macOS).
    if let (Ok(root_canon), Ok(path_canon)) = (fs.canonicalize(root), fs.canonicalize(path)) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return rel.to_path_buf();
        }
    }

    path.to_path_buf()
}

/// Anchor a possibly relative path at the current directory.
///
/// Backends report absolute paths, so roots must be absolute for
/// [`relative_path`] to strip them. Does not touch the filesystem, which
/// keeps it usable for paths that do not exist (yet).
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
