// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use worker_pool_core::{Job, JobError};

/// Sleeps for a while, sometimes fails, and reports its id once it succeeds
pub struct SyntheticJob {
    pub id: usize,
    pub duration: Duration,
    pub failure_rate: f32,
    pub done: mpsc::UnboundedSender<usize>,
}

#[async_trait]
impl Job for SyntheticJob {
    async fn execute(&self) -> Result<(), JobError> {
        tokio::time::sleep(self.duration).await;
        if fastrand::f32() < self.failure_rate {
            return Err(JobError::failed(format!("job {} hit a simulated failure", self.id)));
        }
        let _ = self.done.send(self.id);
        Ok(())
    }
}
