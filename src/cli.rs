// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `fswatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fswatch",
    version,
    about = "Run commands when files under a directory change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Fswatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Fswatch.toml")]
    pub config: String,

    /// Directory to watch. Overrides `[watch].root` from the config.
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FSWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print handlers, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let args = CliArgs::parse_from(["fswatch"]);
        assert_eq!(args.config, "Fswatch.toml");
        assert!(args.root.is_none());
        assert!(!args.dry_run);

        let args = CliArgs::parse_from([
            "fswatch",
            "--config",
            "cfg/watch.toml",
            "--root",
            "/srv/site",
            "--log-level",
            "debug",
            "--dry-run",
        ]);
        assert_eq!(args.config, "cfg/watch.toml");
        assert_eq!(args.root.as_deref(), Some("/srv/site"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
        assert!(args.dry_run);
    }
}
