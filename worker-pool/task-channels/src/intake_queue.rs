// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::DispatchError;
use tokio::sync::mpsc;

/// Creates the queue producers use to submit jobs.
///
/// The sender half is cloned into every producer; the receiver half is
/// handed to [`crate::Dispatcher::run`], which consumes it exclusively.
pub fn intake_queue<J>() -> (IntakeSender<J>, IntakeReceiver<J>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (IntakeSender { tx }, IntakeReceiver { rx })
}

pub struct IntakeSender<J> {
    tx: mpsc::UnboundedSender<J>,
}

impl<J> Clone for IntakeSender<J> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<J> IntakeSender<J> {
    /// Enqueues a job without waiting. Fails once the routing loop is gone.
    pub fn submit(&self, job: J) -> Result<(), DispatchError> {
        self.tx.send(job).map_err(|_| DispatchError::IntakeClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub struct IntakeReceiver<J> {
    rx: mpsc::UnboundedReceiver<J>,
}

impl<J> IntakeReceiver<J> {
    pub(crate) async fn recv(&mut self) -> Option<J> {
        self.rx.recv().await
    }

    /// Closes the queue to producers and returns everything still buffered
    pub(crate) fn drain(&mut self) -> Vec<J> {
        self.rx.close();
        let mut jobs = Vec::new();
        while let Ok(job) = self.rx.try_recv() {
            jobs.push(job);
        }
        jobs
    }
}
