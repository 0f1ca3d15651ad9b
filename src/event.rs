// src/event.rs

use std::fmt;
use std::path::{Path, PathBuf};

use crate::op::Op;

/// A normalized filesystem event.
///
/// `name` is relative to the watch root when the raw path lives under it, and
/// the raw absolute path otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: PathBuf,
    op: Op,
}

impl Event {
    pub fn new(name: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            name: name.into(),
            op,
        }
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    pub fn op(&self) -> Op {
        self.op
    }

    /// The name with forward slashes, suitable for glob matching.
    pub fn name_str(&self) -> String {
        self.name.to_string_lossy().replace('\\', "/")
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.op, self.name.display())
    }
}
