// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use thiserror::Error;
use worker_pool_core::ConfigError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Workers were already created by a previous start
    #[error("dispatcher already started")]
    AlreadyStarted,

    /// The routing loop is already consuming an intake queue
    #[error("dispatcher already running")]
    AlreadyRunning,

    /// Nobody consumes the intake queue anymore
    #[error("intake queue is closed")]
    IntakeClosed,

    /// The routing side of the ready pool is gone
    #[error("ready pool is closed")]
    PoolClosed,
}
