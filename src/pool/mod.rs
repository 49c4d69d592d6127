/*!
 * Worker Pool
 * Bounded pool of OS threads that runs blocking closures and surfaces
 * each completion as an awaitable handle
 *
 * ## Design
 *
 * - Fixed worker count: concurrency is bounded by construction, never by
 *   accounting. Excess submissions queue on the shared channel.
 * - Per-submission result channel: a different submission's panic or error
 *   can never surface in this one's awaiter.
 * - Panics inside a job are captured on the worker and re-raised unchanged
 *   in the awaiting task, matching what a direct call would have done.
 */

use crate::core::errors::BridgeError;
use crate::core::types::PoolConfig;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Point-in-time pool counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub submitted: u64,
    pub completed: u64,
    pub active: usize,
    pub high_water: usize,
    pub queued: usize,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    active: AtomicUsize,
    high_water: AtomicUsize,
}

/// Fixed-size pool of named OS threads for blocking work
pub struct WorkerPool {
    sender: Mutex<Option<flume::Sender<Job>>>,
    receiver: flume::Receiver<Job>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    counters: Arc<Counters>,
    closed: AtomicBool,
    config: PoolConfig,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Self {
        let (sender, receiver) = match config.queue_capacity {
            Some(capacity) => flume::bounded(capacity),
            None => flume::unbounded(),
        };

        let counters = Arc::new(Counters::default());
        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-worker-{}", config.name, index))
                .spawn(move || worker_loop(receiver))
                .expect("failed to spawn worker thread");
            workers.push(handle);
        }

        info!(
            workers = config.workers,
            queue_capacity = ?config.queue_capacity,
            name = %config.name,
            "worker pool started"
        );

        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
            workers: Mutex::new(workers),
            counters,
            closed: AtomicBool::new(false),
            config,
        }
    }

    /// Schedule a blocking closure on the pool
    ///
    /// Returns a handle that resolves with the closure's return value. If
    /// the closure panics, awaiting the handle re-raises the panic in the
    /// awaiting task. Dropping the handle discards the result; the job
    /// itself is never preempted.
    pub fn submit<T, F>(&self, job: F) -> Result<JobHandle<T>, BridgeError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BridgeError::PoolClosed);
        }

        let sender = match self.sender.lock().as_ref() {
            Some(sender) => sender.clone(),
            None => return Err(BridgeError::PoolClosed),
        };

        let (tx, rx) = oneshot::channel();
        let counters = Arc::clone(&self.counters);
        let wrapped: Job = Box::new(move || {
            let running = counters.active.fetch_add(1, Ordering::SeqCst) + 1;
            counters.high_water.fetch_max(running, Ordering::SeqCst);
            let outcome = catch_unwind(AssertUnwindSafe(job));
            counters.active.fetch_sub(1, Ordering::SeqCst);
            counters.completed.fetch_add(1, Ordering::SeqCst);
            // Awaiter may have been cancelled; the result is discarded then.
            let _ = tx.send(outcome);
        });

        match self.config.queue_capacity {
            Some(capacity) => sender.try_send(wrapped).map_err(|err| match err {
                flume::TrySendError::Full(_) => BridgeError::QueueFull { capacity },
                flume::TrySendError::Disconnected(_) => BridgeError::PoolClosed,
            })?,
            None => sender
                .send(wrapped)
                .map_err(|_| BridgeError::PoolClosed)?,
        }

        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        debug!(queued = self.receiver.len(), name = %self.config.name, "job submitted");
        Ok(JobHandle { rx })
    }

    /// Stop accepting submissions; idempotent
    ///
    /// With `wait = true` the caller blocks until queued and in-flight work
    /// drains and all workers exit. With `wait = false` the workers are
    /// abandoned and drain in the background.
    pub fn shutdown(&self, wait: bool) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Dropping the sender closes the queue; workers exit once drained.
        self.sender.lock().take();

        if wait {
            let handles: Vec<_> = self.workers.lock().drain(..).collect();
            for handle in handles {
                if handle.join().is_err() {
                    warn!(name = %self.config.name, "worker thread panicked outside a job");
                }
            }
            info!(name = %self.config.name, "worker pool drained");
        } else {
            let pending = self.receiver.len();
            if pending > 0 {
                warn!(pending, name = %self.config.name, "worker pool abandoned with queued jobs");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.config.workers
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            submitted: self.counters.submitted.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            active: self.counters.active.load(Ordering::SeqCst),
            high_water: self.counters.high_water.load(Ordering::SeqCst),
            queued: self.receiver.len(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::SeqCst) {
            warn!(name = %self.config.name, "worker pool dropped without shutdown; abandoning workers");
            self.shutdown(false);
        }
    }
}

fn worker_loop(receiver: flume::Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        job();
    }
}

/// Awaitable result of one submission
pub struct JobHandle<T> {
    rx: oneshot::Receiver<thread::Result<T>>,
}

impl<T> Future for JobHandle<T> {
    type Output = Result<T, BridgeError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(Ok(value))) => Poll::Ready(Ok(value)),
            Poll::Ready(Ok(Err(payload))) => std::panic::resume_unwind(payload),
            Poll::Ready(Err(_)) => Poll::Ready(Err(BridgeError::ResultLost)),
            Poll::Pending => Poll::Pending,
        }
    }
}
