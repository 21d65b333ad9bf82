// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;

/// Rejected pool configurations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A pool needs at least one worker
    #[error("max_workers must be at least 1")]
    NoWorkers,

    /// Spreading divides the base buffer across `max_workers - 1` steps
    #[error("spread_buffer requires at least 2 workers, got {max_workers}")]
    SpreadWithSingleWorker { max_workers: usize },

    /// The ready pool holds one slot per worker
    #[error("max_workers {max_workers} exceeds the channel limit of {limit}")]
    TooManyWorkers { max_workers: usize, limit: usize },

    /// The largest inbox the policy would hand out
    #[error("buffer size {buffer_size} for worker {index} exceeds the channel limit of {limit}")]
    BufferTooLarge {
        index: usize,
        buffer_size: usize,
        limit: usize,
    },
}
