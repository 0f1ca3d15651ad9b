// src/fs/mock.rs

use super::{EntryKind, FileSystem};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockTree {
    entries: HashMap<PathBuf, MockEntry>,
    unreadable: HashSet<PathBuf>,
}

/// In-memory directory tree shared between clones.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    tree: Arc<Mutex<MockTree>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating any missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut tree = self.tree.lock().unwrap();
        tree.entries.insert(path.to_path_buf(), MockEntry::File);
        link_to_parent(&mut tree.entries, path);
    }

    /// Add a directory (and any missing parents).
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut tree = self.tree.lock().unwrap();
        ensure_dir_entry(&mut tree.entries, path.as_ref());
    }

    /// Remove a path and everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut tree = self.tree.lock().unwrap();
        tree.entries.retain(|p, _| !p.starts_with(path));
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            if let Some(MockEntry::Dir(children)) = tree.entries.get_mut(parent) {
                let name = name.to_string_lossy();
                children.retain(|c| *c != name);
            }
        }
    }

    /// Make `read_dir` fail for this directory.
    pub fn make_unreadable(&self, path: impl Into<PathBuf>) {
        self.tree.lock().unwrap().unreadable.insert(path.into());
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if !entries.contains_key(path) {
        entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        link_to_parent(entries, path);
    }
}

fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = path.parent() else {
        return; // filesystem root
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    if parent == path {
        return;
    }
    ensure_dir_entry(entries, parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {:?}", path))
}

impl FileSystem for MockFileSystem {
    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        let tree = self.tree.lock().unwrap();
        match tree.entries.get(path) {
            Some(MockEntry::File) => Ok(EntryKind::File),
            Some(MockEntry::Dir(_)) => Ok(EntryKind::Dir),
            None => Err(not_found(path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let tree = self.tree.lock().unwrap();
        matches!(tree.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        // In mock, we just return the path as is, assuming absolute paths are used in tests
        Ok(path.to_path_buf())
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>> {
        let tree = self.tree.lock().unwrap();
        if tree.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        match tree.entries.get(path) {
            Some(MockEntry::Dir(children)) => Ok(children
                .iter()
                .map(|name| {
                    let child = path.join(name);
                    let kind = match tree.entries.get(&child) {
                        Some(MockEntry::Dir(_)) => EntryKind::Dir,
                        _ => EntryKind::File,
                    };
                    (child, kind)
                })
                .collect()),
            Some(MockEntry::File) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("not a directory: {:?}", path),
            )),
            None => Err(not_found(path)),
        }
    }
}
