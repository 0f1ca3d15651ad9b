// src/exec/runner.rs

//! Debounced, fault-contained execution of a single handler.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::engine::reporter::ErrorReporter;
use crate::errors::FswatchError;
use crate::event::Event;
use crate::exec::handler::Handler;

/// Wraps one handler with a coalescing execution contract.
///
/// - At most one run is scheduled at a time: while a run is pending, further
///   triggers are absorbed.
/// - A scheduled run starts after the handler's delay. The pending flag is
///   cleared *before* the handler runs, so a trigger arriving during the run
///   schedules a fresh one.
/// - Errors and panics from the handler are reported through the
///   [`ErrorReporter`] and never escape.
pub struct Runner {
    handler: Arc<dyn Handler>,
    pending: AtomicBool,
    reporter: ErrorReporter,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("name", &self.name())
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl Runner {
    pub fn new(handler: Arc<dyn Handler>, reporter: ErrorReporter) -> Self {
        Self {
            handler,
            pending: AtomicBool::new(false),
            reporter,
        }
    }

    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub fn delay(&self) -> Duration {
        self.handler.delay()
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.handler.matches(event)
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// True while a run is scheduled but has not started yet.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Request a run.
    ///
    /// Returns `true` if a new run was scheduled and `false` if the trigger
    /// was coalesced into one that is already pending. Must be called from
    /// within a Tokio runtime.
    pub fn execute(self: &Arc<Self>) -> bool {
        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(handler = %self.name(), "run already pending; coalescing trigger");
            return false;
        }

        let runner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(runner.delay()).await;
            runner.fire().await;
        });
        true
    }

    async fn fire(&self) {
        self.pending.store(false, Ordering::Release);

        let name = self.name().to_string();
        info!(handler = %name, "running handler");

        // Run on its own task so a panic surfaces as a JoinError.
        let handler = Arc::clone(&self.handler);
        let outcome = tokio::spawn(async move { handler.run().await }).await;

        match outcome {
            Ok(Ok(())) => debug!(handler = %name, "handler finished"),
            Ok(Err(err)) => self.reporter.report(FswatchError::HandlerRunFailed {
                name,
                reason: format!("{err:#}"),
            }),
            Err(join_err) if join_err.is_panic() => {
                self.reporter.report(FswatchError::HandlerRunFailed {
                    name,
                    reason: format!("panicked: {}", panic_message(join_err.into_panic())),
                })
            }
            Err(join_err) => debug!(handler = %name, error = %join_err, "handler run cancelled"),
        }
    }

    /// Invoke the handler's stop action.
    pub fn stop(&self) -> crate::errors::Result<()> {
        self.handler
            .stop()
            .map_err(|err| FswatchError::HandlerStopFailed {
                name: self.name().to_string(),
                reason: format!("{err:#}"),
            })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
