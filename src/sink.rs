//! Destinations for outcome notifications.
//!
//! The invoker hands every `Outcome` to an `OutcomeSink`. A terminal log, a
//! tracing logger and a test collector are all just sinks.

use std::io::Write;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::outcome::Outcome;

/// Receives one notification per finished produce or consume attempt.
///
/// Sinks are called from the worker thread that ran the attempt, after the
/// buffer lock has been released, so they may be called concurrently.
pub trait OutcomeSink: Send + Sync {
    fn notify(&self, outcome: &Outcome);
}

impl<F> OutcomeSink for F
where
    F: Fn(&Outcome) + Send + Sync,
{
    fn notify(&self, outcome: &Outcome) {
        self(outcome)
    }
}

/// Emits each outcome as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OutcomeSink for LogSink {
    fn notify(&self, outcome: &Outcome) {
        match outcome {
            Outcome::Rejected(reason) => info!(?reason, "{}", outcome),
            _ => info!(item = outcome.item(), "{}", outcome),
        }
    }
}

/// Keeps every outcome in arrival order.
#[derive(Debug, Default)]
pub struct CollectorSink {
    outcomes: Mutex<Vec<Outcome>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.outcomes.lock().iter().map(|o| o.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.lock().is_empty()
    }
}

impl OutcomeSink for CollectorSink {
    fn notify(&self, outcome: &Outcome) {
        self.outcomes.lock().push(*outcome);
    }
}

/// Writes one line per outcome to any `Write` target, e.g. stdout.
///
/// This plays the part of the text log in a windowed front-end.
pub struct LineSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(out: W) -> Self {
        LineSink { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> OutcomeSink for LineSink<W> {
    fn notify(&self, outcome: &Outcome) {
        let mut out = self.out.lock();
        if let Err(err) = writeln!(out, "{}", outcome).and_then(|()| out.flush()) {
            warn!(%err, "failed to write outcome line");
        }
    }
}
