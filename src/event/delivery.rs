//! Execution contexts for observer notifications and accessor completions.
//!
//! A [`DeliveryContext`] decides where a callback runs. `Inline` runs it on
//! whatever task raised it. `Queued` hands it to a [`DeliveryQueue`], which
//! the application drains on an executor of its choice (a UI thread, a
//! dedicated tokio task). Jobs always run one at a time, in the order they
//! were delivered.

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A deferred notification or completion.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where callbacks run.
#[derive(Clone, Default)]
pub enum DeliveryContext {
    /// Run on the raising task.
    #[default]
    Inline,
    /// Hand over to a [`DeliveryQueue`].
    Queued(mpsc::UnboundedSender<Job>),
}

impl DeliveryContext {
    /// Creates a queued context and the queue that drains it.
    #[must_use]
    pub fn queued() -> (Self, DeliveryQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::Queued(tx), DeliveryQueue { rx })
    }

    /// Returns true for the inline context.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline)
    }

    /// Runs `job` in this context.
    pub fn deliver<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Inline => job(),
            Self::Queued(tx) => {
                if tx.send(Box::new(job)).is_err() {
                    tracing::warn!("delivery queue dropped, discarding callback");
                }
            }
        }
    }
}

impl fmt::Debug for DeliveryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "Inline"),
            Self::Queued(_) => write!(f, "Queued"),
        }
    }
}

/// Receiving end of a queued [`DeliveryContext`].
pub struct DeliveryQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl DeliveryQueue {
    /// Runs the next job, waiting for one if the queue is empty.
    ///
    /// Returns `false` once every sender is gone and the queue is empty.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Runs every job already queued, without waiting. Returns how many ran.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Runs jobs until every sender is gone.
    pub async fn run(mut self) {
        while self.run_next().await {}
        tracing::debug!("delivery queue closed");
    }

    /// Runs jobs on the current (non-async) thread until every sender is gone.
    ///
    /// Must not be called from within an async runtime.
    pub fn run_blocking(mut self) {
        while let Some(job) = self.rx.blocking_recv() {
            job();
        }
        tracing::debug!("delivery queue closed");
    }

    /// Spawns a tokio task that runs jobs until every sender is gone.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
