//! Background populator for cache writes and invalidations.
//!
//! A fixed set of worker tasks, each draining its own bounded queue. Every
//! job carries a shard key and all jobs of one shard go to the same worker,
//! so they run in submission order: a fill scheduled by a read can never
//! land after the invalidation of a write submitted later. Jobs are detached
//! from whoever submitted them: dropping the caller never cancels a queued
//! job, and [`Populator::flush`] lets tests and shutdown wait for quiescence.

use std::collections::hash_map::DefaultHasher;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// A unit of background work.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Populator sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulatorConfig {
    /// Number of worker tasks. Zero is treated as one.
    pub workers: usize,
    /// Bound of each worker's queue. Zero is treated as one.
    pub queue_capacity: usize,
}

impl Default for PopulatorConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 1024,
        }
    }
}

/// Handle to the worker pool. Cloning shares the same workers.
#[derive(Clone)]
pub struct Populator {
    inner: Arc<Inner>,
}

struct Inner {
    senders: RwLock<Vec<mpsc::Sender<Job>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    pending: Arc<watch::Sender<usize>>,
}

/// Worker that owns `shard`. Stable for the life of the process.
fn worker_for(shard: &str, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    shard.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}

impl Populator {
    /// Spawns the worker tasks. Must be called inside a tokio runtime.
    pub fn new(config: PopulatorConfig) -> Self {
        let workers = config.workers.max(1);
        let capacity = config.queue_capacity.max(1);
        let (pending, _) = watch::channel(0usize);
        let pending = Arc::new(pending);

        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let (tx, rx) = mpsc::channel::<Job>(capacity);
            senders.push(tx);
            handles.push(tokio::spawn(run_worker(worker, rx, Arc::clone(&pending))));
        }

        tracing::debug!(workers, capacity, "Populator started");

        Self {
            inner: Arc::new(Inner {
                senders: RwLock::new(senders),
                handles: Mutex::new(handles),
                pending,
            }),
        }
    }

    /// Queues a job behind every earlier job of the same `shard`.
    ///
    /// Waits for room when the shard's queue is full; jobs are never dropped
    /// or reordered. Once the pool is shut down the job runs in place, which
    /// keeps the per-shard order too.
    pub async fn submit<F>(&self, shard: &str, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.pending.send_modify(|n| *n += 1);
        let job: Job = Box::pin(job);

        let sender = {
            let senders = self
                .inner
                .senders
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            (!senders.is_empty()).then(|| senders[worker_for(shard, senders.len())].clone())
        };

        let job = match sender {
            Some(sender) => {
                if sender.capacity() == 0 {
                    tracing::debug!(shard, "Populator queue full, waiting");
                }
                match sender.send(job).await {
                    Ok(()) => return,
                    Err(mpsc::error::SendError(job)) => job,
                }
            }
            None => job,
        };

        run_job(job, &self.inner.pending).await;
    }

    /// Number of submitted jobs that have not finished yet.
    pub fn pending(&self) -> usize {
        *self.inner.pending.borrow()
    }

    /// Waits until every submitted job has finished.
    pub async fn flush(&self) {
        let mut rx = self.inner.pending.subscribe();
        // The sender lives in `inner`, so this only returns once drained.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Closes the worker queues, then waits for everything already queued.
    pub async fn shutdown(&self) {
        self.inner
            .senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let handles = std::mem::take(
            &mut *self
                .inner
                .handles
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "Populator worker ended abnormally");
            }
        }

        self.flush().await;
        tracing::debug!("Populator shut down");
    }
}

async fn run_worker(
    worker: usize,
    mut rx: mpsc::Receiver<Job>,
    pending: Arc<watch::Sender<usize>>,
) {
    tracing::trace!(worker, "Populator worker started");
    while let Some(job) = rx.recv().await {
        run_job(job, &pending).await;
    }
    tracing::trace!(worker, "Populator worker stopped");
}

/// Runs one job on its own task so a panic cannot take the worker down.
async fn run_job(job: Job, pending: &watch::Sender<usize>) {
    if let Err(err) = tokio::spawn(job).await {
        tracing::warn!(error = %err, "Populator job failed");
    }
    pending.send_modify(|n| *n = n.saturating_sub(1));
}
