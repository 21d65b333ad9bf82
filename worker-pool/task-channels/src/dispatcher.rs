// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{
    ready_pool, ChannelCompletionSignaling, DispatchError, IntakeReceiver, ReadyPool, ReadyQueue,
    Worker,
};
use tokio::sync::mpsc::error::SendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use worker_pool_core::{BufferPolicy, CompletionSignaling, Job, WorkerOptions};

/// Routes jobs from an intake queue to whichever worker is idle
///
/// Workers advertise themselves by pushing their inbox into a shared ready
/// pool. The routing loop pairs each intake job with the next advertised
/// inbox, so the longest-idle worker is served first rather than rotating
/// round-robin.
pub struct Dispatcher<J> {
    max_workers: usize,
    options: WorkerOptions,
    policy: BufferPolicy,
    ready_pool: ReadyPool<J>,
    ready_queue: Option<ReadyQueue<J>>,
    workers: Vec<Worker<J>>,
    shutdown: CancellationToken,
    router: Option<JoinHandle<Vec<J>>>,
}

impl<J: Job> Dispatcher<J> {
    pub fn new(max_workers: usize, options: WorkerOptions) -> Result<Self, DispatchError> {
        let policy = BufferPolicy::new(max_workers, &options)?;
        let (ready_pool, ready_queue) = ready_pool(max_workers);

        Ok(Self {
            max_workers,
            options,
            policy,
            ready_pool,
            ready_queue: Some(ready_queue),
            workers: Vec::new(),
            shutdown: CancellationToken::new(),
            router: None,
        })
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    pub fn workers(&self) -> &[Worker<J>] {
        &self.workers
    }

    /// Inbox capacity for the worker at `index`
    pub fn buffer_size(&self, index: usize) -> usize {
        self.policy.size_for(index)
    }

    /// Creates and starts `max_workers` workers. Must be called inside a
    /// tokio runtime.
    pub fn start(&mut self) -> Result<(), DispatchError> {
        if !self.workers.is_empty() {
            return Err(DispatchError::AlreadyStarted);
        }

        info!(
            max_workers = self.max_workers,
            spread_buffer = self.policy.is_spread(),
            "starting workers"
        );

        for index in 0..self.max_workers {
            let options = WorkerOptions {
                buffer_size: self.buffer_size(index),
                spread_buffer: false,
                retry_attempt: self.options.retry_attempt,
            };

            let mut worker = Worker::new(index, options, self.ready_pool.clone());
            worker.start();
            self.workers.push(worker);
        }
        Ok(())
    }

    /// Starts the workers and spawns the routing loop over `intake`.
    /// Returns without waiting for any job.
    pub fn run(&mut self, intake: IntakeReceiver<J>) -> Result<(), DispatchError> {
        if self.router.is_some() || self.ready_queue.is_none() {
            return Err(DispatchError::AlreadyRunning);
        }
        self.start()?;
        let ready_queue = self
            .ready_queue
            .take()
            .ok_or(DispatchError::AlreadyRunning)?;

        info!("dispatcher accepting jobs");
        self.router = Some(tokio::spawn(route(
            intake,
            ready_queue,
            self.shutdown.clone(),
        )));
        Ok(())
    }

    /// Stops the routing loop, then every worker, and waits until all workers
    /// have acknowledged. Running jobs finish first.
    ///
    /// Returns the jobs the routing loop had not handed to a worker yet.
    pub async fn stop(&mut self) -> Vec<J> {
        info!(workers = self.workers.len(), "stopping dispatcher");
        self.shutdown.cancel();

        let undispatched = match self.router.take() {
            Some(router) => router.await.unwrap_or_else(|e| {
                error!(error = %e, "routing loop failed");
                Vec::new()
            }),
            None => Vec::new(),
        };
        if !undispatched.is_empty() {
            warn!(count = undispatched.len(), "jobs not dispatched before stop");
        }

        let mut signaling = ChannelCompletionSignaling::setup(self.workers.len());
        for worker in &mut self.workers {
            worker.stop(signaling.get_token(worker.index()));
        }
        let report = signaling.wait_all().await;

        if report.all_stopped() {
            info!(stopped = report.stopped.len(), "all workers stopped");
        } else {
            error!(failed = ?report.failed, "some workers did not stop cleanly");
        }
        undispatched
    }
}

impl<J> Drop for Dispatcher<J> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Takes one job at a time from intake and hands it to the next idle
/// worker before taking another. Ends on shutdown and returns whatever
/// was not delivered.
async fn route<J: Job>(
    mut intake: IntakeReceiver<J>,
    mut ready: ReadyQueue<J>,
    shutdown: CancellationToken,
) -> Vec<J> {
    loop {
        let job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            job = intake.recv() => job,
        };

        let Some(job) = job else {
            // Every producer is gone. Keep the ready pool open for the
            // workers until the dispatcher is stopped.
            debug!("intake queue closed");
            shutdown.cancelled().await;
            return Vec::new();
        };

        if let Err(job) = hand_off(job, &mut ready, &shutdown).await {
            let mut undispatched = vec![job];
            undispatched.extend(intake.drain());
            return undispatched;
        }
    }
    intake.drain()
}

async fn hand_off<J: Job>(
    mut job: J,
    ready: &mut ReadyQueue<J>,
    shutdown: &CancellationToken,
) -> Result<(), J> {
    loop {
        let inbox = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(job),
            inbox = ready.next_ready() => inbox,
        };
        let Some(inbox) = inbox else {
            return Err(job);
        };

        match inbox.send(job).await {
            Ok(()) => return Ok(()),
            // Only reachable if a worker task ended while the router runs
            Err(SendError(returned)) => {
                trace!("skipping registration of exited worker");
                job = returned;
            }
        }
    }
}
