// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod pool_config;
mod synthetic_job;

use clap::Parser;
use pool_config::PoolConfig;
use std::time::{Duration, Instant};
use synthetic_job::SyntheticJob;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use worker_pool_task_channels::{intake_queue, Dispatcher};

/// Feeds synthetic jobs through a bounded worker pool
#[derive(Debug, Parser)]
struct Args {
    /// JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: String,

    #[arg(long)]
    workers: Option<usize>,

    #[arg(long)]
    buffer_size: Option<usize>,

    #[arg(long)]
    spread_buffer: Option<bool>,

    #[arg(long)]
    retry_attempt: Option<u32>,

    #[arg(long)]
    jobs: Option<usize>,

    /// Give up waiting after this long without a completed job
    #[arg(long, default_value_t = 2_000)]
    idle_millis: u64,
}

impl Args {
    fn apply(&self, config: &mut PoolConfig) {
        if let Some(workers) = self.workers {
            config.max_workers = workers;
        }
        if let Some(buffer_size) = self.buffer_size {
            config.worker.buffer_size = buffer_size;
        }
        if let Some(spread_buffer) = self.spread_buffer {
            config.worker.spread_buffer = spread_buffer;
        }
        if let Some(retry_attempt) = self.retry_attempt {
            config.worker.retry_attempt = retry_attempt;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_time = Instant::now();
    let args = Args::parse();

    let mut config = match PoolConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %args.config, error = %e, "using default configuration");
            PoolConfig::default()
        }
    };
    args.apply(&mut config);

    println!("=== WORKER POOL ===");
    println!("Configuration:");
    println!("  - Workers: {}", config.max_workers);
    println!("  - Buffer size: {}", config.worker.buffer_size);
    println!("  - Spread buffer: {}", config.worker.spread_buffer);
    println!("  - Retry attempts: {}", config.worker.retry_attempt);
    println!("  - Jobs: {}", config.jobs);

    let mut dispatcher = Dispatcher::new(config.max_workers, config.worker.clone())?;
    let (intake, intake_rx) = intake_queue();
    dispatcher.run(intake_rx)?;

    for worker in dispatcher.workers() {
        info!(
            worker = worker.index(),
            buffer_size = worker.buffer_size(),
            "worker ready"
        );
    }

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    for id in 0..config.jobs {
        let millis = fastrand::u64(1..=config.job_millis.max(1));
        intake.submit(SyntheticJob {
            id,
            duration: Duration::from_millis(millis),
            failure_rate: config.failure_rate,
            done: done_tx.clone(),
        })?;
    }
    drop(done_tx);
    drop(intake);

    let idle = Duration::from_millis(args.idle_millis);
    let mut completed = 0usize;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    while completed < config.jobs {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!("\n=== Ctrl+C received, initiating shutdown ===");
                break;
            }
            finished = tokio::time::timeout(idle, done_rx.recv()) => match finished {
                Ok(Some(_)) => completed += 1,
                Ok(None) => break,
                Err(_) => {
                    warn!(completed, "no job completed recently, stopping");
                    break;
                }
            },
        }
    }

    let undispatched = dispatcher.stop().await;

    println!("\n=== RESULTS ===");
    println!("Completed: {}", completed);
    println!(
        "Failed or abandoned: {}",
        config
            .jobs
            .saturating_sub(completed)
            .saturating_sub(undispatched.len())
    );
    println!("Never dispatched: {}", undispatched.len());
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
