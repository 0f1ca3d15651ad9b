// src/engine/mod.rs

//! Event dispatch engine.
//!
//! - [`watcher`] owns the notifier, the watch set and the watch loop that
//!   turns raw notifications into events and fans them out to handlers.
//! - [`registry`] keeps the ordered, deduplicated set of runners.
//! - [`reporter`] is the replaceable error sink every failure ends up in.

pub mod registry;
pub mod reporter;
pub mod watcher;

pub use registry::HandlerRegistry;
pub use reporter::{ErrorCallback, ErrorReporter};
pub use watcher::{Watcher, WatcherState};
