// src/op.rs

//! Operation bitmask attached to every filesystem event.
//!
//! A single raw notification can carry several operations at once (for
//! example a file that was created and immediately written), so `Op` is a set
//! of bits rather than an enum.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Set of filesystem operations observed for a path.
    ///
    /// The empty set means "no recognised operation" and formats to `""`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Op: u32 {
        const CREATE = 1;
        const WRITE = 1 << 1;
        const REMOVE = 1 << 2;
        const RENAME = 1 << 3;
        /// Attribute / permission change.
        const CHMOD = 1 << 4;
    }
}

/// Canonical label order used by `Display`.
const LABELS: [(Op, &str); 5] = [
    (Op::CREATE, "Create"),
    (Op::REMOVE, "Remove"),
    (Op::WRITE, "Write"),
    (Op::RENAME, "Rename"),
    (Op::CHMOD, "Attribute"),
];

impl Op {
    /// Operations that cause handlers to be considered for dispatch.
    pub const DISPATCHABLE: [Op; 4] = [Op::CREATE, Op::WRITE, Op::REMOVE, Op::RENAME];

    /// Returns true if `self` contains *all* bits of at least one candidate.
    ///
    /// `op.is(&[Op::CREATE, Op::WRITE])` reads as "is this a create or a
    /// write".
    pub fn is(self, candidates: &[Op]) -> bool {
        candidates.iter().any(|candidate| self.contains(*candidate))
    }

    /// Labels for every bit that is set, in canonical order.
    pub fn labels(self) -> Vec<&'static str> {
        LABELS
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, label)| *label)
            .collect()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join("|"))
    }
}
