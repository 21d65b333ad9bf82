// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::DispatchError;
use tokio::sync::mpsc;
use worker_pool_core::MAX_CHANNEL_CAPACITY;

/// Creates the bounded pool of idle workers' inboxes.
///
/// `capacity` equals the worker count, and a worker registers at most once per
/// idle period, so registration never waits on a full pool in practice.
pub fn ready_pool<J>(capacity: usize) -> (ReadyPool<J>, ReadyQueue<J>) {
    let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
    (ReadyPool { tx }, ReadyQueue { rx })
}

/// Worker-side handle: idle workers push their inbox here
pub struct ReadyPool<J> {
    tx: mpsc::Sender<mpsc::Sender<J>>,
}

impl<J> Clone for ReadyPool<J> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<J> ReadyPool<J> {
    pub async fn register(&self, inbox: mpsc::Sender<J>) -> Result<(), DispatchError> {
        self.tx
            .send(inbox)
            .await
            .map_err(|_| DispatchError::PoolClosed)
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Routing-side handle: yields the inbox of the next idle worker
pub struct ReadyQueue<J> {
    rx: mpsc::Receiver<mpsc::Sender<J>>,
}

impl<J> ReadyQueue<J> {
    pub async fn next_ready(&mut self) -> Option<mpsc::Sender<J>> {
        self.rx.recv().await
    }

    /// Number of workers currently registered as idle
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
