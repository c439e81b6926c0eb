//! Ordered execution of submitted operations.
//!
//! A [`Sequencer`] is a FIFO task queue serviced by a single worker task.
//! Submissions are enqueued at call time, so the order of `run`/`run_async`
//! calls is the order in which their bodies execute, and no two bodies ever
//! overlap. Each caller receives exactly its own body's outcome; a body that
//! fails or panics never stalls or poisons the queue.
//!
//! ```ignore
//! let seq = Sequencer::new("send");
//! let first = seq.run(|| Ok(1));
//! let second = seq.run_async(|| async { Err::<i32, _>(Error::operation("failure")) });
//! assert_eq!(first.await?, 1);
//! assert!(second.await.is_err());
//! ```

use mercury_core::{Error, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, trace};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Sequencer metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerStats {
    /// Operations accepted into the queue.
    pub submitted: u64,
    /// Operations whose body returned `Ok`.
    pub completed: u64,
    /// Operations whose body returned `Err` or panicked.
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Serializes operations so each runs to completion before the next starts.
pub struct Sequencer {
    name: Arc<str>,
    queue: mpsc::UnboundedSender<Job>,
    // Receiver parked here until the first submission spawns the worker, so a
    // sequencer can be built outside a runtime.
    idle: Mutex<Option<mpsc::UnboundedReceiver<Job>>>,
    counters: Arc<Counters>,
}

impl Sequencer {
    /// Create a sequencer. `name` labels its log lines.
    pub fn new(name: impl Into<String>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        Self {
            name: Arc::from(name.into()),
            queue,
            idle: Mutex::new(Some(rx)),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Submit a synchronous operation.
    ///
    /// The operation is queued before this returns; the returned future only
    /// waits for its outcome. Dropping the future does not cancel the operation.
    pub fn run<T, F>(&self, op: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        self.run_async(move || std::future::ready(op()))
    }

    /// Submit an asynchronous operation.
    ///
    /// Same ordering and failure isolation as [`run`](Self::run); the body is
    /// awaited to completion before the next submission starts.
    pub fn run_async<T, F, Fut>(&self, op: F) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let counters = Arc::clone(&self.counters);
        let job: Job = Box::pin(async move {
            let outcome = op().await;
            if outcome.is_ok() {
                counters.completed.fetch_add(1, Ordering::Relaxed);
            } else {
                counters.failed.fetch_add(1, Ordering::Relaxed);
            }
            // Caller may have stopped waiting; the body still ran.
            let _ = done_tx.send(outcome);
        });

        let queued = self.submit(job);
        let name = Arc::clone(&self.name);
        async move {
            queued?;
            match done_rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::operation(format!(
                    "operation on sequencer '{}' panicked",
                    name
                ))),
            }
        }
    }

    /// Return a snapshot of sequencer metrics.
    pub fn stats(&self) -> SequencerStats {
        SequencerStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    fn submit(&self, job: Job) -> Result<()> {
        if let Some(rx) = self.idle.lock().take() {
            tokio::spawn(worker_loop(
                Arc::clone(&self.name),
                rx,
                Arc::clone(&self.counters),
            ));
        }
        self.queue
            .send(job)
            .map_err(|_| Error::already_closed(format!("sequencer '{}' stopped", self.name)))?;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish()
    }
}

async fn worker_loop(
    name: Arc<str>,
    mut rx: mpsc::UnboundedReceiver<Job>,
    counters: Arc<Counters>,
) {
    while let Some(job) = rx.recv().await {
        // Each body runs in its own task so a panic is contained to the join
        // handle; the loop moves on to the next submission either way.
        if let Err(e) = tokio::spawn(job).await {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            error!(target: "mercury::sequencer", sequencer = %name, error = %e, "sequenced operation panicked");
        }
    }
    trace!(target: "mercury::sequencer", sequencer = %name, "sequencer worker stopped");
}
