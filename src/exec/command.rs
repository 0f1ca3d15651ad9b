// src/exec/command.rs

//! Handler that runs a shell command, built from `[handler.<name>]`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ConfigFile, HandlerSpec};
use crate::event::Event;
use crate::exec::handler::{Handler, HandlerFuture};
use crate::op::Op;
use crate::watch::patterns::PathPatterns;

/// Runs `cmd` through the platform shell whenever a matching event settles.
///
/// Stopping the handler kills any running instance and turns later runs
/// into no-ops.
#[derive(Debug)]
pub struct CommandHandler {
    name: String,
    cmd: String,
    delay: Duration,
    ops: Op,
    patterns: PathPatterns,
    workdir: PathBuf,
    shutdown: CancellationToken,
}

impl CommandHandler {
    pub fn new(spec: &HandlerSpec, workdir: impl Into<PathBuf>) -> Self {
        Self {
            name: spec.name.clone(),
            cmd: spec.cmd.clone(),
            delay: spec.delay,
            ops: spec.ops,
            patterns: spec.patterns.clone(),
            workdir: workdir.into(),
            shutdown: CancellationToken::new(),
        }
    }

    /// One handler per `[handler.<name>]`, in name order.
    pub fn from_config(cfg: &ConfigFile, workdir: &Path) -> Vec<Self> {
        cfg.handlers()
            .iter()
            .map(|spec| Self::new(spec, workdir))
            .collect()
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    async fn run_command(&self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            debug!(handler = %self.name, "handler stopped; skipping run");
            return Ok(());
        }

        info!(handler = %self.name, cmd = %self.cmd, "starting command");

        let mut child = shell_command(&self.cmd)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning process for handler '{}'", self.name))?;

        // Either the process exits on its own, or the handler is stopped.
        tokio::select! {
            status_res = child.wait() => {
                let status = status_res.with_context(|| {
                    format!("waiting for process of handler '{}'", self.name)
                })?;
                let code = status.code().unwrap_or(-1);

                info!(
                    handler = %self.name,
                    exit_code = code,
                    success = status.success(),
                    "command exited"
                );

                if !status.success() {
                    bail!("command `{}` exited with status {}", self.cmd, code);
                }
            }

            _ = self.shutdown.cancelled() => {
                info!(handler = %self.name, "stop requested; killing running command");
                if let Err(e) = child.kill().await {
                    warn!(handler = %self.name, error = %e, "failed to kill command on stop");
                }
            }
        }

        Ok(())
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

impl Handler for CommandHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn matches(&self, event: &Event) -> bool {
        event.op().intersects(self.ops) && self.patterns.matches(&event.name_str())
    }

    fn run(&self) -> HandlerFuture<'_> {
        Box::pin(self.run_command())
    }

    fn stop(&self) -> Result<()> {
        self.shutdown.cancel();
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::RawConfigFile;

    fn handler_from(toml_src: &str, workdir: &Path) -> CommandHandler {
        let raw: RawConfigFile = toml::from_str(toml_src).unwrap();
        let cfg = ConfigFile::try_from(raw).unwrap();
        CommandHandler::from_config(&cfg, workdir).remove(0)
    }

    #[test]
    fn matches_on_ops_and_patterns() {
        let handler = handler_from(
            r#"
[handler.rust]
cmd = "true"
watch = ["src/**/*.rs"]
exclude = ["src/generated/**"]
ops = ["write", "create"]
"#,
            Path::new("."),
        );

        assert!(handler.matches(&Event::new("src/main.rs", Op::WRITE)));
        assert!(handler.matches(&Event::new("src/main.rs", Op::CREATE | Op::CHMOD)));
        assert!(!handler.matches(&Event::new("src/main.rs", Op::REMOVE)));
        assert!(!handler.matches(&Event::new("src/generated/x.rs", Op::WRITE)));
        assert!(!handler.matches(&Event::new("README.md", Op::WRITE)));
    }

    #[tokio::test]
    async fn runs_in_workdir_and_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();

        let ok = handler_from(
            "[handler.touch]\ncmd = \"echo done > marker.txt\"\n",
            dir.path(),
        );
        ok.run().await.unwrap();
        assert!(dir.path().join("marker.txt").exists());

        let failing = handler_from("[handler.fail]\ncmd = \"exit 3\"\n", dir.path());
        let err = failing.run().await.unwrap_err();
        assert!(err.to_string().contains("status 3"));
    }

    #[tokio::test]
    async fn stop_kills_running_command_and_disables_runs() {
        let dir = tempfile::tempdir().unwrap();
        let handler = std::sync::Arc::new(handler_from(
            "[handler.sleepy]\ncmd = \"sleep 30\"\n",
            dir.path(),
        ));

        let running = {
            let handler = std::sync::Arc::clone(&handler);
            tokio::spawn(async move { handler.run().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        handler.stop().unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .expect("command was not killed")
            .unwrap();
        assert!(result.is_ok());

        // Later runs are no-ops.
        handler.run().await.unwrap();
    }
}
