//! Trigger surface: one worker thread per requested operation.
//!
//! Front-ends call `request_produce` / `request_consume` (or `submit`) and get
//! a `Ticket` back immediately. The worker runs the attempt against the shared
//! buffer, hands the outcome to the sink, and returns it through the ticket.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::trace;

use crate::outcome::Outcome;
use crate::sink::OutcomeSink;
use crate::{BufferConsumer, BufferProducer};

/// An operation a front-end can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    Produce,
    Consume,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown request {0:?}, expected produce or consume")]
pub struct ParseRequestError(String);

impl FromStr for Request {
    type Err = ParseRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "produce" => Ok(Request::Produce),
            "c" | "consume" => Ok(Request::Consume),
            other => Err(ParseRequestError(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum InvokerError {
    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
}

/// Handle for one submitted request.
#[must_use = "a ticket should be waited on to observe its outcome"]
pub struct Ticket {
    request: Request,
    handle: JoinHandle<Outcome>,
}

impl Ticket {
    pub fn request(&self) -> Request {
        self.request
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker is done and return its outcome.
    ///
    /// A panic in the worker means a buffer invariant was broken; it is
    /// re-raised here rather than swallowed.
    pub fn wait(self) -> Outcome {
        match self.handle.join() {
            Ok(outcome) => outcome,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}

/// Spawns a worker per request against one shared buffer.
#[derive(Clone)]
pub struct Invoker {
    producer: BufferProducer,
    consumer: BufferConsumer,
    sink: Arc<dyn OutcomeSink>,
    next_id: Arc<AtomicU64>,
}

impl Invoker {
    pub fn new(producer: BufferProducer, consumer: BufferConsumer, sink: Arc<dyn OutcomeSink>) -> Self {
        Invoker {
            producer,
            consumer,
            sink,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `request` on a fresh thread. Never waits for the attempt itself.
    pub fn submit(&self, request: Request) -> Result<Ticket, InvokerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let sink = Arc::clone(&self.sink);

        let builder = thread::Builder::new();
        let handle = match request {
            Request::Produce => {
                let producer = self.producer.clone();
                builder.name(format!("producer-{}", id)).spawn(move || {
                    let outcome = producer.produce();
                    sink.notify(&outcome);
                    trace!(id, %outcome, "produce request finished");
                    outcome
                })?
            }
            Request::Consume => {
                let consumer = self.consumer.clone();
                builder.name(format!("consumer-{}", id)).spawn(move || {
                    let outcome = consumer.consume();
                    sink.notify(&outcome);
                    trace!(id, %outcome, "consume request finished");
                    outcome
                })?
            }
        };

        trace!(id, ?request, "request submitted");
        Ok(Ticket { request, handle })
    }

    pub fn request_produce(&self) -> Result<Ticket, InvokerError> {
        self.submit(Request::Produce)
    }

    pub fn request_consume(&self) -> Result<Ticket, InvokerError> {
        self.submit(Request::Consume)
    }

    /// Wait for a batch of tickets, returning outcomes in submission order.
    pub fn wait_all<I>(tickets: I) -> Vec<Outcome>
    where
        I: IntoIterator<Item = Ticket>,
    {
        tickets.into_iter().map(Ticket::wait).collect()
    }

    /// Join every ticket in `pending` whose worker has already finished and
    /// return their outcomes. Unfinished tickets stay in `pending`.
    ///
    /// Joining (rather than dropping) finished tickets means a panicked
    /// worker is re-raised here, not lost.
    pub fn reap_finished(pending: &mut Vec<Ticket>) -> Vec<Outcome> {
        let (finished, running): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(Ticket::is_finished);
        *pending = running;
        Self::wait_all(finished)
    }
}
