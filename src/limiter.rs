//! Bounded concurrency for outbound upstream requests.
//!
//! Tasks wait on a FIFO semaphore; the permit is an RAII guard, so a task
//! that errors, panics or is cancelled always hands its slot to the next
//! waiter.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::trace;

/// Errors raised by the limiter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimiterError {
    #[error("Concurrency limit must be at least 1")]
    ZeroCapacity,

    #[error("Concurrency limiter has been closed")]
    Closed,
}

/// Caps the number of tasks running at once.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter when the task slot is released.
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyLimiter {
    /// Create a limiter allowing `capacity` concurrent tasks.
    pub fn new(capacity: usize) -> Result<Self, LimiterError> {
        if capacity == 0 {
            return Err(LimiterError::ZeroCapacity);
        }
        Ok(Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a running task.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Tasks currently holding a permit.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run one task once a slot is free.
    pub async fn run<F, T>(&self, task: F) -> Result<T, LimiterError>
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| LimiterError::Closed)?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));
        trace!(in_flight = self.in_flight(), "limiter slot acquired");

        Ok(task.await)
    }

    /// Run every task with at most `capacity` in flight.
    ///
    /// Outputs come back in submission order, whatever order the tasks
    /// finished in.
    pub async fn run_all<I, F, T>(&self, tasks: I) -> Result<Vec<T>, LimiterError>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = T>,
    {
        futures::future::try_join_all(tasks.into_iter().map(|task| self.run(task))).await
    }
}
