// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::Deserialize;
use std::fs;
use worker_pool_core::WorkerOptions;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_workers: usize,
    pub worker: WorkerOptions,
    pub jobs: usize,
    /// Upper bound of a synthetic job's duration
    pub job_millis: u64,
    /// Probability that a single attempt fails
    pub failure_rate: f32,
}

impl PoolConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: PoolConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            worker: WorkerOptions::new(100)
                .with_spread_buffer(true)
                .with_retry_attempt(2),
            jobs: 1_000,
            job_millis: 20,
            failure_rate: 0.05,
        }
    }
}
