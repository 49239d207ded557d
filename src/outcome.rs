use std::fmt;

use thiserror::Error;

/// Value stored in a buffer slot. Items are numbered from 1 upwards.
pub type Item = u64;

/// Why a produce or consume attempt was turned away.
///
/// Rejections are ordinary results of contention, not faults. The `Display`
/// text is the line shown to the user.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Every slot already holds an item.
    #[error("Buffer is full! Cannot produce.")]
    BufferFull,

    /// No slot holds an item.
    #[error("Buffer is empty! Cannot consume.")]
    BufferEmpty,
}

/// Result of a single `try_produce` or `try_consume` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Produced(Item),
    Consumed(Item),
    Rejected(Rejection),
}

impl Outcome {
    /// The item moved by this attempt, if it succeeded.
    pub fn item(&self) -> Option<Item> {
        match *self {
            Outcome::Produced(item) | Outcome::Consumed(item) => Some(item),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Produced(item) => write!(f, "Producer produces item {}", item),
            Outcome::Consumed(item) => write!(f, "Consumer consumes item {}", item),
            Outcome::Rejected(reason) => fmt::Display::fmt(reason, f),
        }
    }
}
