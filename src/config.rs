use thiserror::Error;

use crate::threadsafe::BoundedBuffer;

/// Default number of slots.
pub const BUFFER_SIZE: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A buffer must have at least one slot.
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,
}

/// Settings for building a `BoundedBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        BufferConfig { capacity: BUFFER_SIZE }
    }
}

impl BufferConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        BufferConfig { capacity }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    /// Validate and build the buffer.
    pub fn build(&self) -> Result<BoundedBuffer, ConfigError> {
        self.validate()?;
        Ok(BoundedBuffer::new(self.capacity))
    }
}
