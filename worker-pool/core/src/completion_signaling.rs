// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;

/// Trait for sending a worker's completion signal
#[async_trait]
pub trait CompletionSender: Send + Sync + Clone {
    /// `Ok(worker_id)` for a clean exit, `Err(worker_id)` otherwise.
    /// Returns false if nobody is listening anymore.
    async fn signal(&self, result: Result<usize, usize>) -> bool;
}

/// Outcome of waiting on every worker of a pool
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub stopped: Vec<usize>,
    pub failed: Vec<usize>,
}

impl CompletionReport {
    pub fn total(&self) -> usize {
        self.stopped.len() + self.failed.len()
    }

    pub fn all_stopped(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fan-out/fan-in barrier: one token per worker, one signal expected back
/// from each.
pub trait CompletionSignaling: Send {
    /// The token type passed to workers for signaling completion
    type Token: CompletionSender + 'static;

    /// Setup completion signaling for N workers
    fn setup(num_workers: usize) -> Self;

    /// Get the completion token for a specific worker
    fn get_token(&self, worker_id: usize) -> Self::Token;

    /// Wait for the next worker to complete or fail.
    /// Returns None once every expected worker has signaled.
    fn wait_next(
        &mut self,
    ) -> impl std::future::Future<Output = Option<Result<usize, usize>>> + Send;

    /// Wait until every worker has signaled
    fn wait_all(&mut self) -> impl std::future::Future<Output = CompletionReport> + Send
    where
        Self: Sized,
    {
        async move {
            let mut report = CompletionReport::default();
            while let Some(result) = self.wait_next().await {
                match result {
                    Ok(worker_id) => report.stopped.push(worker_id),
                    Err(worker_id) => report.failed.push(worker_id),
                }
            }
            report.stopped.sort_unstable();
            report.failed.sort_unstable();
            report
        }
    }
}
