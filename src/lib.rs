//! A bounded buffer shared by on-demand producers and consumers.
//!
//! Every produce or consume is a single attempt: admission is decided by a
//! non-blocking take on a slot semaphore, and a caller that finds no room (or
//! nothing to take) gets a `Rejected` outcome instead of waiting. Only the
//! short critical section around the ring storage can block.
//!
//! ```
//! use bounded_buffer::{Outcome, Rejection};
//!
//! let (producer, consumer) = bounded_buffer::new(2);
//! assert_eq!(producer.produce(), Outcome::Produced(1));
//! assert_eq!(producer.produce(), Outcome::Produced(2));
//! assert_eq!(producer.produce(), Outcome::Rejected(Rejection::BufferFull));
//! assert_eq!(consumer.consume(), Outcome::Consumed(1));
//! ```

use std::sync::Arc;

pub mod config;
pub mod invoker;
pub mod outcome;
pub mod reference;
pub mod semaphore;
pub mod sink;
pub mod threadsafe;

pub use config::{BufferConfig, ConfigError, BUFFER_SIZE};
pub use invoker::{Invoker, InvokerError, Request, Ticket};
pub use outcome::{Item, Outcome, Rejection};
pub use sink::{CollectorSink, LineSink, LogSink, OutcomeSink};
pub use threadsafe::{BoundedBuffer, SlotCounts};

/// Producer-side handle. Cheap to clone; every clone shares the same buffer.
#[derive(Clone)]
pub struct BufferProducer {
    inner: Arc<BoundedBuffer>,
}

impl BufferProducer {
    pub fn produce(&self) -> Outcome {
        self.inner.try_produce()
    }

    pub fn buffer(&self) -> &BoundedBuffer {
        &self.inner
    }
}

#[doc(hidden)]
impl From<Arc<BoundedBuffer>> for BufferProducer {
    fn from(inner: Arc<BoundedBuffer>) -> Self {
        BufferProducer { inner }
    }
}

/// Consumer-side handle. Cheap to clone; every clone shares the same buffer.
#[derive(Clone)]
pub struct BufferConsumer {
    inner: Arc<BoundedBuffer>,
}

impl BufferConsumer {
    pub fn consume(&self) -> Outcome {
        self.inner.try_consume()
    }

    pub fn buffer(&self) -> &BoundedBuffer {
        &self.inner
    }
}

#[doc(hidden)]
impl From<Arc<BoundedBuffer>> for BufferConsumer {
    fn from(inner: Arc<BoundedBuffer>) -> Self {
        BufferConsumer { inner }
    }
}

/// Create a buffer with `capacity` slots and return its two role handles.
///
/// # Panics
/// Panics if `capacity` is zero. Use `BufferConfig::build` to get an error
/// instead.
pub fn new(capacity: usize) -> (BufferProducer, BufferConsumer) {
    split(Arc::new(BoundedBuffer::new(capacity)))
}

/// Wrap an existing shared buffer in its two role handles.
pub fn split(buffer: Arc<BoundedBuffer>) -> (BufferProducer, BufferConsumer) {
    (buffer.clone().into(), buffer.into())
}
