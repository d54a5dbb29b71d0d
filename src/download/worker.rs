//! Fixed-size download worker pool.

use std::sync::Arc;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::download::queue::{queue_channel, QueueItem, QueueSender, SharedQueueReceiver};
use crate::error::{Error, Result};
use crate::fs::{Destination, NameGenerator};
use crate::media::MediaRecord;
use crate::output::Progress;

/// Everything a worker needs to turn a dequeued record into files.
pub struct WorkerContext {
    pub api: Arc<ApiClient>,
    pub destination: Destination,
    pub namegen: Arc<dyn NameGenerator>,
    /// Write a JSON metadata document next to each artifact.
    pub dump_metadata: bool,
    /// Suppress the binary write entirely; implies `dump_metadata`.
    pub metadata_only: bool,
    /// Advanced once per dequeued record; must be internally synchronized.
    pub progress: Option<Arc<dyn Progress>>,
}

/// A running pool of download workers draining one shared queue.
///
/// The owning scope must end the pool's life on every exit path, either
/// with [`WorkerPool::shutdown_graceful`] once all work is enqueued or
/// with [`WorkerPool::shutdown_forced`] when bailing out early.
pub struct WorkerPool {
    jobs: usize,
    tx: QueueSender,
    handles: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Spawn `jobs` workers draining a fresh queue.
    pub fn start(jobs: usize, ctx: WorkerContext) -> Self {
        let (tx, rx) = queue_channel();
        let cancel = CancellationToken::new();
        let ctx = Arc::new(ctx);

        let handles = (0..jobs)
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&ctx),
                    Arc::clone(&rx),
                    cancel.clone(),
                ))
            })
            .collect();

        Self {
            jobs,
            tx,
            handles,
            cancel,
        }
    }

    /// A producer handle for the pool's queue.
    pub fn sender(&self) -> QueueSender {
        self.tx.clone()
    }

    /// Enqueue a record for download. Never blocks.
    pub fn enqueue(&self, record: MediaRecord) {
        // Send only fails once every worker is gone, in which case the
        // record is dropped along with the run.
        let _ = self.tx.send(QueueItem::Media(record));
    }

    /// Graceful shutdown: one sentinel per worker, then wait for all of
    /// them to drain the queue and exit.
    pub async fn shutdown_graceful(mut self) {
        for _ in 0..self.jobs {
            let _ = self.tx.send(QueueItem::Sentinel);
        }
        self.join_all().await;
    }

    /// Forced shutdown: signal all workers to stop regardless of queue
    /// state and wait for them to exit. Unconsumed items are dropped;
    /// in-flight downloads are abandoned.
    pub async fn shutdown_forced(mut self) {
        self.cancel.cancel();
        self.join_all().await;
    }

    async fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!("Worker task panicked: {}", e);
            }
        }
    }
}

async fn worker_loop(
    id: usize,
    ctx: Arc<WorkerContext>,
    rx: SharedQueueReceiver,
    cancel: CancellationToken,
) {
    loop {
        // Hold the queue lock only while dequeuing, never during the
        // download itself.
        let item = {
            let mut rx = rx.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                item = rx.recv() => item,
            }
        };

        match item {
            None | Some(QueueItem::Sentinel) => break,
            Some(QueueItem::Media(record)) => {
                if let Err(e) = process_record(&ctx, &record).await {
                    tracing::warn!(
                        "Worker {}: failed to download '{}': {}",
                        id,
                        record.shortcode,
                        e
                    );
                }
                if let Some(progress) = &ctx.progress {
                    progress.advance(1);
                }
            }
        }
    }

    tracing::debug!("Worker {} exiting", id);
}

/// Download one queue item: the record itself, or every child for a
/// sidecar. Child failures are reported individually and do not stop the
/// remaining children.
async fn process_record(ctx: &WorkerContext, record: &MediaRecord) -> Result<()> {
    if record.is_sidecar() {
        for child in &record.children {
            if let Err(e) = download_one(ctx, child).await {
                tracing::warn!(
                    "Failed sidecar child '{}' of '{}': {}",
                    child.id,
                    record.shortcode,
                    e
                );
            }
        }
    } else {
        download_one(ctx, record).await?;
    }

    if ctx.dump_metadata {
        dump_metadata(ctx, record).await?;
    }

    Ok(())
}

/// Fetch and write a single record's binary payload.
async fn download_one(ctx: &WorkerContext, record: &MediaRecord) -> Result<()> {
    if ctx.metadata_only {
        return Ok(());
    }

    let filename = ctx.namegen.file(record)?;
    let path = ctx.destination.path_of(&filename);

    if path.exists() {
        tracing::debug!("Skipping existing file: {}", path.display());
        return Ok(());
    }

    let url = record
        .payload_url()
        .ok_or_else(|| Error::Media(format!("record '{}' has no payload URL", record.id)))?;

    let response = ctx.api.fetch(url).await?;

    let mut file = File::create(&path).await?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::DownloadFailed(format!("stream error: {}", e)))?;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    tracing::debug!("Downloaded: {}", path.display());
    Ok(())
}

/// Write the record's raw fields as a JSON document next to the artifact.
async fn dump_metadata(ctx: &WorkerContext, record: &MediaRecord) -> Result<()> {
    let base = ctx.namegen.base_name(record)?;
    let path = ctx.destination.path_of(&format!("{}.json", base));
    let body = serde_json::to_vec_pretty(&record.raw)?;
    tokio::fs::write(&path, body).await?;
    Ok(())
}
