// src/exec/handler.rs

//! The handler capability set and a closure-backed implementation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::Result;

use crate::event::Event;

/// Future returned by [`Handler::run`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Something that reacts to filesystem events.
///
/// The watcher knows nothing about concrete handlers beyond these five
/// operations.
pub trait Handler: Send + Sync + 'static {
    /// Stable name; registration is deduplicated on it.
    fn name(&self) -> &str;

    /// Quiet period to wait before running after a trigger.
    fn delay(&self) -> Duration;

    fn matches(&self, event: &Event) -> bool;

    fn run(&self) -> HandlerFuture<'_>;

    fn stop(&self) -> Result<()>;
}

type Matcher = Box<dyn Fn(&Event) -> bool + Send + Sync>;
type Action = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Handler assembled from closures.
///
/// ```
/// use std::time::Duration;
/// use fswatch::FnHandler;
///
/// let handler = FnHandler::new("log", Duration::from_millis(100), || {
///     println!("something changed");
///     Ok(())
/// })
/// .with_matcher(|event| event.name_str().ends_with(".rs"));
/// ```
pub struct FnHandler {
    name: String,
    delay: Duration,
    matcher: Matcher,
    action: Action,
    on_stop: Option<Action>,
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl FnHandler {
    /// A handler that matches every event and runs `action`.
    pub fn new<F>(name: impl Into<String>, delay: Duration, action: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            delay,
            matcher: Box::new(|_: &Event| true),
            action: Box::new(action),
            on_stop: None,
        }
    }

    pub fn with_matcher<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn on_stop<S>(mut self, on_stop: S) -> Self
    where
        S: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.on_stop = Some(Box::new(on_stop));
        self
    }
}

impl Handler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn matches(&self, event: &Event) -> bool {
        (self.matcher)(event)
    }

    fn run(&self) -> HandlerFuture<'_> {
        Box::pin(async move { (self.action)() })
    }

    fn stop(&self) -> Result<()> {
        match &self.on_stop {
            Some(on_stop) => on_stop(),
            None => Ok(()),
        }
    }
}
