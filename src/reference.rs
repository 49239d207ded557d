//! Single-threaded model of the buffer protocol.
//!
//! Holds the same state as `BoundedBuffer` but with plain integers and no
//! synchronization. Used as an oracle: any sequential run of the real buffer
//! must produce exactly the outcomes this model does.

use std::collections::VecDeque;

use crate::outcome::{Item, Outcome, Rejection};

pub struct ReferenceBuffer {
    capacity: usize,
    data: VecDeque<Item>,
    counter: Item,
}

impl ReferenceBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0);
        ReferenceBuffer {
            capacity,
            data: VecDeque::with_capacity(capacity),
            counter: 0,
        }
    }

    pub fn produce(&mut self) -> Outcome {
        if self.data.len() == self.capacity {
            return Outcome::Rejected(Rejection::BufferFull);
        }
        self.counter += 1;
        self.data.push_back(self.counter);
        Outcome::Produced(self.counter)
    }

    pub fn consume(&mut self) -> Outcome {
        match self.data.pop_front() {
            Some(item) => Outcome::Consumed(item),
            None => Outcome::Rejected(Rejection::BufferEmpty),
        }
    }

    pub fn empty_slots(&self) -> usize {
        self.capacity - self.data.len()
    }

    pub fn full_slots(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threadsafe::{BoundedBuffer, SlotCounts};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_model_scenario() {
        let mut model = ReferenceBuffer::new(2);
        assert_eq!(model.produce(), Outcome::Produced(1));
        assert_eq!(model.produce(), Outcome::Produced(2));
        assert_eq!(model.produce(), Outcome::Rejected(Rejection::BufferFull));
        assert_eq!(model.consume(), Outcome::Consumed(1));
        assert_eq!(model.consume(), Outcome::Consumed(2));
        assert_eq!(model.consume(), Outcome::Rejected(Rejection::BufferEmpty));
    }

    /// Test: random sequential runs of the real buffer match the model step
    /// for step, including slot counts after every call.
    #[test]
    fn test_buffer_matches_model() {
        for seed in 0..32u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let capacity = rng.gen_range(1..=12);
            // Bias towards one side per run so both full and empty get hit
            let produce_bias = rng.gen_range(0.2..0.8);

            let buffer = BoundedBuffer::new(capacity);
            let mut model = ReferenceBuffer::new(capacity);
            let mut last_produced: Item = 0;

            for step in 0..500 {
                let (actual, expected) = if rng.gen_bool(produce_bias) {
                    (buffer.try_produce(), model.produce())
                } else {
                    (buffer.try_consume(), model.consume())
                };
                assert_eq!(actual, expected, "seed {} step {}", seed, step);

                if let Outcome::Produced(item) = actual {
                    assert!(item > last_produced);
                    last_produced = item;
                }

                assert_eq!(
                    buffer.slot_counts(),
                    SlotCounts {
                        empty: model.empty_slots(),
                        full: model.full_slots(),
                    },
                    "seed {} step {}",
                    seed,
                    step
                );
            }
        }
    }
}
