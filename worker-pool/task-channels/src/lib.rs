// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod dispatch_error;
pub use dispatch_error::DispatchError;

pub mod intake_queue;
pub use intake_queue::{intake_queue, IntakeReceiver, IntakeSender};

pub mod ready_pool;
pub use ready_pool::{ready_pool, ReadyPool, ReadyQueue};

pub mod channel_completion_signaling;
pub use channel_completion_signaling::{ChannelCompletionSender, ChannelCompletionSignaling};

mod worker;
pub use worker::Worker;

mod dispatcher;
pub use dispatcher::Dispatcher;
