//! Frontier queue shared between seed submission, link discovery and workers
//!
//! This module handles:
//! - Unbounded FIFO hand-off of jobs from any number of producers
//! - Suspending workers until a job is available
//! - Broadcasting a stop that wakes every waiting worker
//! - Tracking outstanding work so an exhausted frontier can be detected

use crate::crawler::job::Job;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// Unbounded, closable FIFO of crawl jobs
///
/// `push` never blocks. `pop` suspends the calling task until a job is
/// available or the frontier is closed. A job counts as outstanding from the
/// moment it is pushed until the worker that popped it calls [`complete`].
///
/// [`complete`]: Frontier::complete
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<Job>>,
    notify: Notify,
    closed: AtomicBool,
    outstanding: AtomicUsize,
}

impl Frontier {
    /// Creates an empty, open frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a job
    ///
    /// Returns false (and drops the job) if the frontier is closed.
    pub fn push(&self, job: Job) -> bool {
        if self.is_closed() {
            return false;
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.lock().push_back(job);
        self.notify.notify_one();
        true
    }

    /// Takes the next job, waiting until one is available
    ///
    /// Returns `None` once the frontier is closed, even if jobs remain queued.
    pub async fn pop(&self) -> Option<Job> {
        loop {
            // Register interest before checking state so a concurrent push or
            // close between the check and the await is not missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_closed() {
                return None;
            }

            if let Some(job) = self.lock().pop_front() {
                return Some(job);
            }

            notified.await;
        }
    }

    /// Takes the next job without waiting
    pub fn try_pop(&self) -> Option<Job> {
        if self.is_closed() {
            return None;
        }
        self.lock().pop_front()
    }

    /// Marks one popped job as finished and returns the remaining outstanding count
    ///
    /// Any re-enqueue or discovered links must be pushed before calling this.
    pub fn complete(&self) -> usize {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            })
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    /// Closes the frontier and wakes every waiting `pop`
    ///
    /// Returns true if this call closed it.
    pub fn close(&self) -> bool {
        let was_open = !self.closed.swap(true, Ordering::SeqCst);
        self.notify.notify_waiters();
        was_open
    }

    /// Returns true once the frontier is closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of queued jobs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no job is queued
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Jobs queued or being processed
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
