//! Concurrent download execution.
//!
//! This module provides:
//! - The work queue shared between discovery and the pool
//! - The fixed-size worker pool with graceful and forced shutdown

pub mod queue;
pub mod worker;

pub use queue::{queue_channel, QueueItem, QueueSender};
pub use worker::{WorkerContext, WorkerPool};
