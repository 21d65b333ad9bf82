// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Failure reported for a single execution attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job failed: {0}")]
    Failed(String),

    #[error("job panicked: {0}")]
    Panicked(String),
}

impl JobError {
    pub fn failed(message: impl Into<String>) -> Self {
        JobError::Failed(message.into())
    }
}

/// A unit of work routed to one idle worker
///
/// A worker may run `execute` more than once when it is configured with
/// retry attempts, so implementations take `&self`.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    async fn execute(&self) -> Result<(), JobError>;
}

/// Lets one dispatcher carry different job types
#[async_trait]
impl Job for Box<dyn Job> {
    async fn execute(&self) -> Result<(), JobError> {
        (**self).execute().await
    }
}

/// Job backed by an async closure
pub struct FnJob<F> {
    f: F,
}

impl<F> FnJob<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Job for FnJob<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), JobError>> + Send + 'static,
{
    async fn execute(&self) -> Result<(), JobError> {
        (self.f)().await
    }
}
