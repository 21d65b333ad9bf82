// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod worker_options;
pub use worker_options::WorkerOptions;

mod config_error;
pub use config_error::ConfigError;

mod buffer_policy;
pub use buffer_policy::{BufferPolicy, MAX_CHANNEL_CAPACITY};

pub mod job;
pub use job::{FnJob, Job, JobError};

pub mod completion_signaling;
pub use completion_signaling::{CompletionReport, CompletionSender, CompletionSignaling};
