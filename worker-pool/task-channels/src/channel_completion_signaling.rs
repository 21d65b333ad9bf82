// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use tokio::sync::mpsc;
use worker_pool_core::{CompletionSender, CompletionSignaling};

/// mpsc-based completion barrier
pub struct ChannelCompletionSignaling {
    tx: mpsc::Sender<Result<usize, usize>>,
    rx: mpsc::Receiver<Result<usize, usize>>,
    remaining: usize,
}

#[derive(Clone)]
pub struct ChannelCompletionSender {
    tx: mpsc::Sender<Result<usize, usize>>,
}

#[async_trait]
impl CompletionSender for ChannelCompletionSender {
    async fn signal(&self, result: Result<usize, usize>) -> bool {
        self.tx.send(result).await.is_ok()
    }
}

impl CompletionSignaling for ChannelCompletionSignaling {
    type Token = ChannelCompletionSender;

    fn setup(num_workers: usize) -> Self {
        let (tx, rx) = mpsc::channel(num_workers.max(1));
        Self {
            tx,
            rx,
            remaining: num_workers,
        }
    }

    fn get_token(&self, _worker_id: usize) -> Self::Token {
        ChannelCompletionSender {
            tx: self.tx.clone(),
        }
    }

    async fn wait_next(&mut self) -> Option<Result<usize, usize>> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.rx.recv().await?;
        self.remaining -= 1;
        Some(result)
    }
}
