// src/watch/mod.rs

//! Watch-set maintenance and path matching.
//!
//! This module is responsible for:
//! - Registering a directory tree with the notifier, one directory at a time.
//! - Expressing event paths relative to the watch root.
//! - Compiling `watch` / `exclude` glob patterns for config-driven handlers.
//!
//! It does **not** know about handlers or dispatch.

pub mod path_utils;
pub mod patterns;
pub mod watch_set;

pub use path_utils::{absolute_path, relative_path};
pub use patterns::{PathPatterns, RawPatternSpec, WatchDefaults};
pub use watch_set::WatchSet;
