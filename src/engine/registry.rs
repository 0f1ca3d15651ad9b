// src/engine/registry.rs

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::engine::reporter::ErrorReporter;
use crate::exec::handler::Handler;
use crate::exec::runner::Runner;

/// Ordered, name-deduplicated collection of runners.
///
/// The list is append-only: registration order is dispatch order, and
/// entries are never reordered or removed. Dispatch works on a snapshot so
/// registrations may happen while the watch loop is running.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    runners: RwLock<Vec<Arc<Runner>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `handler` in a runner and append it.
    ///
    /// Returns `false` (and leaves the registry untouched) when a handler
    /// with the same name is already registered.
    pub fn register(&self, handler: Arc<dyn Handler>, reporter: &ErrorReporter) -> bool {
        let mut runners = self
            .runners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if runners.iter().any(|r| r.name() == handler.name()) {
            info!(handler = %handler.name(), "handler already registered; ignoring");
            return false;
        }

        info!(handler = %handler.name(), "registering handler");
        runners.push(Arc::new(Runner::new(handler, reporter.clone())));
        true
    }

    /// Runners in registration order.
    pub fn snapshot(&self) -> Vec<Arc<Runner>> {
        self.runners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns true if any registered runner satisfies `predicate`.
    pub fn find<P>(&self, predicate: P) -> bool
    where
        P: Fn(&Runner) -> bool,
    {
        self.runners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|r| predicate(r.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.runners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::exec::handler::FnHandler;

    fn handler(name: &str) -> Arc<dyn Handler> {
        Arc::new(FnHandler::new(name, Duration::from_millis(10), || Ok(())))
    }

    #[test]
    fn duplicate_names_register_once() {
        let registry = HandlerRegistry::new();
        let reporter = ErrorReporter::default();

        assert!(registry.register(handler("build"), &reporter));
        assert!(!registry.register(handler("build"), &reporter));
        assert!(registry.register(handler("test"), &reporter));

        let names: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["build", "test"]);
    }

    #[test]
    fn find_inspects_registered_runners() {
        let registry = HandlerRegistry::new();
        registry.register(handler("build"), &ErrorReporter::default());

        assert!(registry.find(|r| r.name() == "build"));
        assert!(!registry.find(|r| r.name() == "deploy"));
        assert!(!registry.find(|r| r.is_pending()));
    }
}
