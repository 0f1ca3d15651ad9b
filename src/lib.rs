// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod event;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod notifier;
pub mod op;
pub mod types;
pub mod watch;

pub use engine::{ErrorReporter, Watcher, WatcherState};
pub use errors::FswatchError;
pub use event::Event;
pub use exec::{CommandHandler, FnHandler, Handler, HandlerFuture, Runner};
pub use op::Op;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - one `CommandHandler` per configured handler
/// - the watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config from {:?}", config_path))?;

    let root = match &args.root {
        Some(root) => PathBuf::from(root),
        None => cfg.resolve_root(&config_dir(&config_path)),
    };

    if args.dry_run {
        print_dry_run(&cfg, &root);
        return Ok(());
    }

    let watcher = Watcher::new(&root).context("creating filesystem watcher")?;
    for handler in CommandHandler::from_config(&cfg, &root) {
        watcher.handle(handler);
    }

    let cancel = CancellationToken::new();
    watcher.start(&cancel);
    if watcher.state() != WatcherState::Started {
        bail!("failed to start watching {:?}", root);
    }

    info!(root = ?root, handlers = watcher.handler_count(), "watching; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("listening for Ctrl-C")?;

    info!("shutdown requested");
    watcher.stop();
    watcher.wait().await;
    Ok(())
}

/// Directory containing the config file.
///
/// A bare filename like "Fswatch.toml" (parent = "") falls back to the
/// current working directory.
fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_dry_run(cfg: &ConfigFile, root: &Path) {
    println!("fswatch dry-run");
    println!("  root = {}", root.display());
    println!();

    println!("handlers ({}):", cfg.handlers().len());
    for spec in cfg.handlers() {
        println!("  - {}", spec.name);
        println!("      cmd: {}", spec.cmd);
        println!("      delay: {:?}", spec.delay);
        println!("      ops: {}", spec.ops);
        if let Some(handler) = cfg.handler.get(&spec.name) {
            if let Some(ref watch) = handler.watch {
                println!("      watch: {:?}", watch);
            }
            if let Some(ref exclude) = handler.exclude {
                if !exclude.is_empty() {
                    println!("      exclude: {:?}", exclude);
                }
            }
        }
    }
}
