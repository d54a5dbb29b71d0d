//! Work queue shared between discovery and the worker pool.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::media::MediaRecord;

/// One unit of work on the queue.
#[derive(Debug)]
pub enum QueueItem {
    /// A record to download. Has already passed the active filter.
    Media(MediaRecord),

    /// Poison pill terminating exactly one worker.
    Sentinel,
}

/// Producer half of the queue. Enqueuing never blocks.
pub type QueueSender = mpsc::UnboundedSender<QueueItem>;

/// Consumer half, shared by all workers. Locking serializes dequeues;
/// `recv` blocks while the queue is empty.
pub type SharedQueueReceiver = Arc<Mutex<mpsc::UnboundedReceiver<QueueItem>>>;

/// Create the FIFO work queue for one download invocation.
pub fn queue_channel() -> (QueueSender, SharedQueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Arc::new(Mutex::new(rx)))
}
