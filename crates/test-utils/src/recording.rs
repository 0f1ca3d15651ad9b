use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::time::Instant;

use fswatch::{Event, Handler, HandlerFuture};

#[derive(Debug, Default)]
struct Record {
    runs: Vec<Instant>,
    stops: usize,
    events_seen: Vec<Event>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

type Matcher = Box<dyn Fn(&Event) -> bool + Send + Sync>;

/// A handler that records every run and stop, for assertions in tests.
///
/// Each run is timestamped with `tokio::time::Instant`, so timing checks work
/// under a paused clock. Use [`RecordingHandler::probe`] to keep a view of the
/// records after the handler has been moved into a watcher.
pub struct RecordingHandler {
    name: String,
    delay: Duration,
    matcher: Matcher,
    run_behaviour: Behaviour,
    fail_stop: bool,
    record: Arc<Mutex<Record>>,
}

/// Read-only view of a [`RecordingHandler`]'s history.
#[derive(Debug, Clone)]
pub struct RecordingProbe {
    record: Arc<Mutex<Record>>,
}

impl RecordingHandler {
    /// Matches every event; runs succeed.
    pub fn new(name: &str, delay: Duration) -> Self {
        Self {
            name: name.to_string(),
            delay,
            matcher: Box::new(|_: &Event| true),
            run_behaviour: Behaviour::Succeed,
            fail_stop: false,
            record: Arc::new(Mutex::new(Record::default())),
        }
    }

    pub fn matching<M>(mut self, matcher: M) -> Self
    where
        M: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.matcher = Box::new(matcher);
        self
    }

    /// Every run returns an error.
    pub fn failing(mut self) -> Self {
        self.run_behaviour = Behaviour::Fail;
        self
    }

    /// Every run panics.
    pub fn panicking(mut self) -> Self {
        self.run_behaviour = Behaviour::Panic;
        self
    }

    /// `stop` returns an error (after being recorded).
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn probe(&self) -> RecordingProbe {
        RecordingProbe {
            record: Arc::clone(&self.record),
        }
    }
}

impl RecordingProbe {
    pub fn runs(&self) -> usize {
        self.record.lock().unwrap().runs.len()
    }

    pub fn run_times(&self) -> Vec<Instant> {
        self.record.lock().unwrap().runs.clone()
    }

    pub fn stops(&self) -> usize {
        self.record.lock().unwrap().stops
    }

    /// Events the handler's matcher accepted.
    pub fn matched_events(&self) -> Vec<Event> {
        self.record.lock().unwrap().events_seen.clone()
    }
}

impl Handler for RecordingHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn delay(&self) -> Duration {
        self.delay
    }

    fn matches(&self, event: &Event) -> bool {
        let matched = (self.matcher)(event);
        if matched {
            self.record.lock().unwrap().events_seen.push(event.clone());
        }
        matched
    }

    fn run(&self) -> HandlerFuture<'_> {
        Box::pin(async move {
            self.record.lock().unwrap().runs.push(Instant::now());
            match self.run_behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Fail => Err(anyhow!("{} failed on purpose", self.name)),
                Behaviour::Panic => panic!("{} panicked on purpose", self.name),
            }
        })
    }

    fn stop(&self) -> Result<()> {
        self.record.lock().unwrap().stops += 1;
        if self.fail_stop {
            return Err(anyhow!("{} refused to stop", self.name));
        }
        Ok(())
    }
}
