//! Thread-safe bounded buffer with fail-fast admission.
//!
//! # Protocol
//! - Admission: a non-blocking take on the `empty` (produce) or `full`
//!   (consume) slot semaphore, done before and outside the lock
//! - Critical section: a `parking_lot::Mutex` around storage, both indices and
//!   the item counter, and nothing else
//! - Publication: the opposite semaphore is released after the lock is dropped
//!
//! The lock is never held while touching a semaphore, so the two kinds of
//! primitive cannot deadlock against each other.

use crossbeam_utils::CachePadded;
use parking_lot::Mutex;
use tracing::debug;

use crate::outcome::{Item, Outcome, Rejection};
use crate::semaphore::SlotSemaphore;

/// Snapshot of the two slot counts.
///
/// Each field is read atomically, but the pair is only guaranteed to add up
/// to the capacity when no produce or consume is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotCounts {
    pub empty: usize,
    pub full: usize,
}

impl SlotCounts {
    pub fn total(&self) -> usize {
        self.empty + self.full
    }
}

/// Circular storage guarded by the buffer lock.
struct Ring {
    slots: Vec<Option<Item>>,
    in_index: usize,
    out_index: usize,
    counter: Item,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Ring {
            slots: vec![None; capacity],
            in_index: 0,
            out_index: 0,
            counter: 0,
        }
    }

    // Caller holds an `empty` permit, so the slot at in_index is free.
    fn put_next(&mut self) -> Item {
        let len = self.slots.len();
        assert!(self.in_index < len, "in_index {} out of range", self.in_index);
        assert!(
            self.slots[self.in_index].is_none(),
            "overwriting occupied slot {}",
            self.in_index
        );

        self.counter += 1;
        let item = self.counter;
        self.slots[self.in_index] = Some(item);
        self.in_index = (self.in_index + 1) % len;
        item
    }

    // Caller holds a `full` permit, so the slot at out_index is occupied.
    fn take_next(&mut self) -> Item {
        let len = self.slots.len();
        assert!(self.out_index < len, "out_index {} out of range", self.out_index);
        let item = match self.slots[self.out_index].take() {
            Some(item) => item,
            None => panic!("reading empty slot {}", self.out_index),
        };
        self.out_index = (self.out_index + 1) % len;
        item
    }

    fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

/// A fixed-capacity circular buffer shared by producers and consumers.
///
/// Neither `try_produce` nor `try_consume` waits for capacity. When no slot is
/// available they return `Outcome::Rejected` immediately; the only point where
/// a caller can block is the short critical section.
///
/// # Cache Layout
/// - `empty` is on its own cache line (taken by producers, given by consumers)
/// - `full` is on its own cache line (taken by consumers, given by producers)
/// - `ring` sits behind the lock
pub struct BoundedBuffer {
    empty: CachePadded<SlotSemaphore>,
    full: CachePadded<SlotSemaphore>,
    ring: Mutex<Ring>,
    capacity: usize,
}

impl BoundedBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "bounded buffer needs at least one slot");

        BoundedBuffer {
            empty: CachePadded::new(SlotSemaphore::new(capacity, capacity)),
            full: CachePadded::new(SlotSemaphore::new(0, capacity)),
            ring: Mutex::new(Ring::new(capacity)),
            capacity,
        }
    }

    /// Try to produce the next item.
    ///
    /// Returns `Rejected(BufferFull)` without waiting if no slot is empty.
    pub fn try_produce(&self) -> Outcome {
        if !self.empty.try_acquire() {
            debug!("no empty slot, produce rejected");
            return Outcome::Rejected(Rejection::BufferFull);
        }

        let item = {
            let mut ring = self.ring.lock();
            ring.put_next()
        };

        // Publish only after the lock is released
        self.full.release();

        debug!(item, "item produced");
        Outcome::Produced(item)
    }

    /// Try to consume the oldest item.
    ///
    /// Returns `Rejected(BufferEmpty)` without waiting if no slot is full.
    pub fn try_consume(&self) -> Outcome {
        if !self.full.try_acquire() {
            debug!("no full slot, consume rejected");
            return Outcome::Rejected(Rejection::BufferEmpty);
        }

        let item = {
            let mut ring = self.ring.lock();
            ring.take_next()
        };

        self.empty.release();

        debug!(item, "item consumed");
        Outcome::Consumed(item)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn slot_counts(&self) -> SlotCounts {
        SlotCounts {
            empty: self.empty.available(),
            full: self.full.available(),
        }
    }

    /// Number of items currently stored, read under the lock.
    ///
    /// Can run ahead of `slot_counts().full` by the number of producers that
    /// have written but not yet published.
    pub fn len(&self) -> usize {
        self.ring.lock().occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the item counter, i.e. the last item handed out.
    pub fn produced_total(&self) -> Item {
        self.ring.lock().counter
    }
}
