//! Single-thread delayed job runner.
//!
//! The worker thread is spawned on the first [`Timer::schedule`] call and
//! lives until [`Timer::shutdown`]. Jobs run on the worker in deadline
//! order, without the timer lock held.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::error::{Error, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Scheduled {
    deadline: Instant,
    id: u64,
    job: Job,
}

// Reversed so that `BinaryHeap` pops the earliest deadline first.
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Scheduled {}

struct TimerState {
    jobs: BinaryHeap<Scheduled>,
    next_id: u64,
    shutdown: bool,
}

struct TimerShared {
    state: Mutex<TimerState>,
    wake: Condvar,
}

/// Background thread running single-shot delayed jobs.
pub(crate) struct Timer {
    name: String,
    shared: Arc<TimerShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Cancellation handle for one scheduled job.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    id: u64,
    shared: Weak<TimerShared>,
}

impl TimerHandle {
    /// Removes the job if it has not started. Returns `true` if removed.
    pub(crate) fn cancel(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let mut state = shared.state.lock();
        let before = state.jobs.len();
        state.jobs.retain(|s| s.id != self.id);
        let removed = state.jobs.len() != before;
        if removed {
            shared.wake.notify_all();
        }
        removed
    }
}

impl Timer {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(TimerShared {
                state: Mutex::new(TimerState {
                    jobs: BinaryHeap::new(),
                    next_id: 0,
                    shutdown: false,
                }),
                wake: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Runs `job` on the worker thread once `delay` has elapsed.
    pub(crate) fn schedule<F>(&self, delay: Duration, job: F) -> Result<TimerHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ensure_worker()?;

        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(Error::Cancelled);
        }
        let id = state.next_id;
        state.next_id += 1;
        state.jobs.push(Scheduled {
            deadline: Instant::now() + delay,
            id,
            job: Box::new(job),
        });
        self.shared.wake.notify_all();
        trace!(timer = %self.name, id, ?delay, "job scheduled");

        Ok(TimerHandle {
            id,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// Number of jobs waiting for their deadline.
    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }

    pub(crate) fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    /// Discards queued jobs and stops the worker thread.
    ///
    /// A job already running is allowed to finish. Calling this from inside
    /// a job does not wait for the worker.
    pub(crate) fn shutdown(&self) {
        let discarded = {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
            let jobs = std::mem::take(&mut state.jobs);
            self.shared.wake.notify_all();
            jobs
        };
        // Dropped outside the lock: a job's captures may take other locks.
        let count = discarded.len();
        drop(discarded);

        // Taken before joining: a concurrent `schedule` must be able to see
        // the worker is gone rather than block on this lock.
        let worker = self.worker.lock().take();
        if let Some(handle) = worker {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        debug!(timer = %self.name, discarded = count, "timer shut down");
    }

    fn ensure_worker(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }
        if self.shared.state.lock().shutdown {
            return Err(Error::Cancelled);
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run(shared))
            .map_err(|e| Error::TimerUnavailable(e.to_string()))?;
        debug!(timer = %self.name, "timer thread started");
        *worker = Some(handle);
        Ok(())
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(shared: Arc<TimerShared>) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            break;
        }
        let next_deadline = state.jobs.peek().map(|s| s.deadline);
        match next_deadline {
            None => shared.wake.wait(&mut state),
            Some(deadline) if deadline > Instant::now() => {
                shared.wake.wait_until(&mut state, deadline);
            }
            Some(_) => {
                if let Some(next) = state.jobs.pop() {
                    MutexGuard::unlocked(&mut state, next.job);
                }
            }
        }
    }
}
