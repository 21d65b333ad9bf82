// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};

/// Options shared by the dispatcher and handed to each worker
///
/// The dispatcher treats `retry_attempt` as opaque and only forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerOptions {
    /// Base capacity of a worker's delivery channel
    pub buffer_size: usize,
    /// Skew buffer sizes across workers by index
    pub spread_buffer: bool,
    /// Extra executions a worker grants a failing job
    pub retry_attempt: u32,
}

impl WorkerOptions {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    pub fn with_spread_buffer(mut self, spread_buffer: bool) -> Self {
        self.spread_buffer = spread_buffer;
        self
    }

    pub fn with_retry_attempt(mut self, retry_attempt: u32) -> Self {
        self.retry_attempt = retry_attempt;
        self
    }
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            buffer_size: 100,
            spread_buffer: false,
            retry_attempt: 0,
        }
    }
}
