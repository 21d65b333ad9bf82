// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{ConfigError, WorkerOptions};

/// Largest capacity a bounded tokio channel accepts
pub const MAX_CHANNEL_CAPACITY: usize = usize::MAX >> 3;

/// Per-worker inbox sizing
///
/// Without spreading every worker gets `buffer_size`. With spreading, worker
/// `n` gets `floor(buffer_size * 0.75) + n * floor(buffer_size / (2 * (max_workers - 1)))`,
/// so capacity grows linearly from roughly 75% to 125% of the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPolicy {
    base: usize,
    slice: Option<usize>,
}

impl BufferPolicy {
    pub fn new(max_workers: usize, options: &WorkerOptions) -> Result<Self, ConfigError> {
        if max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if max_workers > MAX_CHANNEL_CAPACITY {
            return Err(ConfigError::TooManyWorkers {
                max_workers,
                limit: MAX_CHANNEL_CAPACITY,
            });
        }

        let policy = if options.spread_buffer {
            if max_workers == 1 {
                return Err(ConfigError::SpreadWithSingleWorker { max_workers });
            }
            let steps = (max_workers - 1).saturating_mul(2);
            Self {
                base: options.buffer_size,
                slice: Some(options.buffer_size / steps),
            }
        } else {
            Self {
                base: options.buffer_size,
                slice: None,
            }
        };

        // Sizes never decrease with the index, so the last worker is the largest
        let index = max_workers - 1;
        let buffer_size = policy.size_for(index);
        if buffer_size > MAX_CHANNEL_CAPACITY {
            return Err(ConfigError::BufferTooLarge {
                index,
                buffer_size,
                limit: MAX_CHANNEL_CAPACITY,
            });
        }
        Ok(policy)
    }

    /// Inbox capacity for the worker at `index`
    pub fn size_for(&self, index: usize) -> usize {
        match self.slice {
            None => self.base,
            Some(slice) => three_quarters(self.base).saturating_add(index.saturating_mul(slice)),
        }
    }

    pub fn is_spread(&self) -> bool {
        self.slice.is_some()
    }
}

/// `floor(value * 0.75)` without going through floating point or overflowing
fn three_quarters(value: usize) -> usize {
    value / 4 * 3 + value % 4 * 3 / 4
}
