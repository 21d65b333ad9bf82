// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{DispatchError, ReadyPool};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};
use worker_pool_core::{CompletionSender, Job, JobError, WorkerOptions, MAX_CHANNEL_CAPACITY};

/// Long-lived task that executes one job at a time
///
/// While idle the worker keeps exactly one registration of its inbox in the
/// ready pool. A stop request never interrupts a running job.
pub struct Worker<J> {
    index: usize,
    options: WorkerOptions,
    ready_pool: ReadyPool<J>,
    inbox_tx: mpsc::Sender<J>,
    inbox_rx: Option<mpsc::Receiver<J>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<(), DispatchError>>>,
}

impl<J: Job> Worker<J> {
    pub fn new(index: usize, options: WorkerOptions, ready_pool: ReadyPool<J>) -> Self {
        // tokio channels cannot be zero-sized
        let capacity = options.buffer_size.clamp(1, MAX_CHANNEL_CAPACITY);
        let (inbox_tx, inbox_rx) = mpsc::channel(capacity);
        Self {
            index,
            options,
            ready_pool,
            inbox_tx,
            inbox_rx: Some(inbox_rx),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Inbox capacity assigned by the buffer policy
    pub fn buffer_size(&self) -> usize {
        self.options.buffer_size
    }

    /// Capacity of the inbox channel actually allocated
    pub fn inbox_capacity(&self) -> usize {
        self.inbox_tx.max_capacity()
    }

    pub fn retry_attempt(&self) -> u32 {
        self.options.retry_attempt
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawns the registration loop. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        let Some(inbox_rx) = self.inbox_rx.take() else {
            warn!(worker = self.index, "worker already started");
            return;
        };

        debug!(
            worker = self.index,
            buffer_size = self.options.buffer_size,
            "starting worker"
        );

        let task = tokio::spawn(work_loop(
            self.index,
            self.options.retry_attempt,
            self.ready_pool.clone(),
            self.inbox_tx.clone(),
            inbox_rx,
            self.cancel.clone(),
        ));
        self.task = Some(task);
    }

    /// Requests termination and signals `completion` exactly once, after the
    /// worker has fully exited.
    pub fn stop<C>(&mut self, completion: C)
    where
        C: CompletionSender + 'static,
    {
        self.cancel.cancel();
        let index = self.index;
        let task = self.task.take();

        tokio::spawn(async move {
            let result = match task {
                None => Ok(index),
                Some(task) => match task.await {
                    Ok(Ok(())) => Ok(index),
                    Ok(Err(e)) => {
                        error!(worker = index, error = %e, "worker exited unexpectedly");
                        Err(index)
                    }
                    Err(e) => {
                        error!(worker = index, error = %e, "worker task failed");
                        Err(index)
                    }
                },
            };
            if !completion.signal(result).await {
                warn!(worker = index, "nobody waiting for worker completion");
            }
        });
    }
}

impl<J> Drop for Worker<J> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn work_loop<J: Job>(
    index: usize,
    retry_attempt: u32,
    ready_pool: ReadyPool<J>,
    inbox_tx: mpsc::Sender<J>,
    mut inbox_rx: mpsc::Receiver<J>,
    cancel: CancellationToken,
) -> Result<(), DispatchError> {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            registered = ready_pool.register(inbox_tx.clone()) => registered?,
        }
        trace!(worker = index, "registered as ready");

        // A job already handed over wins against a stop request
        let job = tokio::select! {
            biased;
            job = inbox_rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
            _ = cancel.cancelled() => break,
        };

        execute(index, retry_attempt, job).await;
    }

    inbox_rx.close();
    let mut abandoned = 0usize;
    while inbox_rx.try_recv().is_ok() {
        abandoned += 1;
    }
    if abandoned > 0 {
        warn!(worker = index, abandoned, "jobs left in inbox at shutdown");
    }
    debug!(worker = index, "worker stopped");
    Ok(())
}

/// Runs `job` up to `retry_attempt + 1` times. Each attempt gets its own task
/// so a panicking job fails the attempt instead of the worker.
async fn execute<J: Job>(index: usize, retry_attempt: u32, job: J) {
    let job = Arc::new(job);
    let attempts = retry_attempt.saturating_add(1);

    for attempt in 1..=attempts {
        let running = Arc::clone(&job);
        let outcome = match tokio::spawn(async move { running.execute().await }).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => Err(JobError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(JobError::failed(e.to_string())),
        };

        match outcome {
            Ok(()) => {
                trace!(worker = index, attempt, "job completed");
                return;
            }
            Err(e) => warn!(worker = index, attempt, attempts, error = %e, "job attempt failed"),
        }
    }

    warn!(worker = index, attempts, "giving up on job");
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
