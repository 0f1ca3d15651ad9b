// src/exec/mod.rs

//! Handler execution layer.
//!
//! - [`handler`] defines the `Handler` capability set and `FnHandler`.
//! - [`runner`] wraps a handler with debounced, fault-contained execution.
//! - [`command`] provides `CommandHandler`, which runs a shell command and is
//!   what the `fswatch` binary registers for each configured handler.

pub mod command;
pub mod handler;
pub mod runner;

pub use command::CommandHandler;
pub use handler::{FnHandler, Handler, HandlerFuture};
pub use runner::Runner;
