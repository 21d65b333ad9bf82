// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use worker_pool_core::{CompletionSignaling, FnJob, Job, WorkerOptions};
use worker_pool_task_channels::{ready_pool, ChannelCompletionSignaling, Worker};

const WAIT: Duration = Duration::from_secs(5);

type BoxedJob = Box<dyn Job>;

fn reporting_job(id: usize, seen: &mpsc::UnboundedSender<usize>) -> BoxedJob {
    let seen = seen.clone();
    Box::new(FnJob::new(move || {
        let seen = seen.clone();
        async move {
            let _ = seen.send(id);
            Ok(())
        }
    }))
}

// ============================================================
// Registration
// ============================================================

#[tokio::test]
async fn test_worker_registers_once_per_idle_period() {
    let (pool, mut ready) = ready_pool::<BoxedJob>(2);
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    assert_eq!(pool.capacity(), 2);
    let mut worker = Worker::new(0, WorkerOptions::new(4), pool);
    worker.start();

    let inbox = timeout(WAIT, ready.next_ready()).await.unwrap().unwrap();
    sleep(Duration::from_millis(20)).await;
    assert!(ready.is_empty(), "idle worker registered twice");
    assert_eq!(ready.len(), 0);

    inbox.send(reporting_job(1, &seen_tx)).await.unwrap();
    assert_eq!(timeout(WAIT, seen_rx.recv()).await.unwrap(), Some(1));

    // Back to idle: a fresh registration shows up
    let inbox = timeout(WAIT, ready.next_ready()).await.unwrap().unwrap();
    inbox.send(reporting_job(2, &seen_tx)).await.unwrap();
    assert_eq!(timeout(WAIT, seen_rx.recv()).await.unwrap(), Some(2));

    let mut signaling = ChannelCompletionSignaling::setup(1);
    worker.stop(signaling.get_token(0));
    signaling.wait_all().await;
}

#[test]
fn test_zero_buffer_still_gets_an_inbox() {
    let (pool, _ready) = ready_pool::<BoxedJob>(1);
    let worker = Worker::new(3, WorkerOptions::new(0).with_retry_attempt(5), pool);

    assert_eq!(worker.index(), 3);
    assert_eq!(worker.buffer_size(), 0);
    assert_eq!(worker.inbox_capacity(), 1);
    assert_eq!(worker.retry_attempt(), 5);
    assert!(!worker.is_running());
}

// ============================================================
// Stop and completion barrier
// ============================================================

#[tokio::test]
async fn test_stop_signals_completion_once() {
    let (pool, _ready) = ready_pool::<BoxedJob>(1);
    let mut worker = Worker::new(0, WorkerOptions::new(1), pool);
    worker.start();

    let mut signaling = ChannelCompletionSignaling::setup(1);
    worker.stop(signaling.get_token(0));

    assert_eq!(
        timeout(WAIT, signaling.wait_next()).await.unwrap(),
        Some(Ok(0))
    );
    assert_eq!(signaling.wait_next().await, None);
    assert!(!worker.is_running());
}

#[tokio::test]
async fn test_handed_over_job_runs_despite_stop() {
    let (pool, mut ready) = ready_pool::<BoxedJob>(1);
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
    let mut worker = Worker::new(0, WorkerOptions::new(1), pool);
    worker.start();
    let inbox = timeout(WAIT, ready.next_ready()).await.unwrap().unwrap();

    // Single-threaded runtime: the worker cannot run between these two calls,
    // so it wakes up with both a job and a stop request pending.
    assert!(inbox.try_send(reporting_job(9, &seen_tx)).is_ok());
    let mut signaling = ChannelCompletionSignaling::setup(1);
    worker.stop(signaling.get_token(0));
    let report = timeout(WAIT, signaling.wait_all()).await.unwrap();

    assert_eq!(report.stopped, vec![0]);
    assert_eq!(seen_rx.try_recv().ok(), Some(9));
}

#[tokio::test]
async fn test_stop_of_unstarted_worker_still_signals() {
    let (pool, _ready) = ready_pool::<BoxedJob>(1);
    let mut worker = Worker::new(5, WorkerOptions::new(1), pool);

    let mut signaling = ChannelCompletionSignaling::setup(1);
    worker.stop(signaling.get_token(5));
    let report = timeout(WAIT, signaling.wait_all()).await.unwrap();

    assert_eq!(report.stopped, vec![5]);
    assert!(report.failed.is_empty());
}

#[tokio::test]
async fn test_worker_without_router_reports_failure() {
    let (pool, ready) = ready_pool::<BoxedJob>(1);
    drop(ready);
    let mut worker = Worker::new(2, WorkerOptions::new(1), pool);
    worker.start();

    // Let the loop hit the closed pool on its own before asking it to stop
    timeout(WAIT, async {
        while worker.is_running() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker kept running without a router");

    let mut signaling = ChannelCompletionSignaling::setup(1);
    worker.stop(signaling.get_token(2));
    let report = timeout(WAIT, signaling.wait_all()).await.unwrap();

    assert!(report.stopped.is_empty());
    assert_eq!(report.failed, vec![2]);
}

#[tokio::test]
async fn test_barrier_waits_for_every_worker() {
    let (pool, _ready) = ready_pool::<BoxedJob>(3);
    let mut workers: Vec<_> = (0..3)
        .map(|index| Worker::new(index, WorkerOptions::new(1), pool.clone()))
        .collect();
    for worker in &mut workers {
        worker.start();
    }

    let mut signaling = ChannelCompletionSignaling::setup(workers.len());
    for worker in &mut workers {
        worker.stop(signaling.get_token(worker.index()));
    }
    let report = timeout(WAIT, signaling.wait_all()).await.unwrap();

    assert_eq!(report.stopped, vec![0, 1, 2]);
    assert_eq!(report.total(), 3);
}
