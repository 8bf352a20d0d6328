//! A write-once, many-reader result slot.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::Result;

/// Shared handle to the eventual outcome of a throttled execution.
///
/// The outcome is set exactly once; later attempts are ignored. Any number
/// of clones may wait on it, and all of them observe the same outcome.
/// Clones share identity, see [`ptr_eq`](Self::ptr_eq).
pub struct SharedFuture<T> {
    inner: Arc<Slot<T>>,
}

struct Slot<T> {
    outcome: Mutex<Option<Result<T>>>,
    ready: Condvar,
}

impl<T: Clone> SharedFuture<T> {
    /// Creates a future that already holds `value`.
    pub fn completed(value: T) -> Self {
        Self::resolved(Ok(value))
    }

    pub(crate) fn resolved(outcome: Result<T>) -> Self {
        let future = Self::pending();
        future.complete(outcome);
        future
    }

    /// Returns `true` once the outcome is available.
    pub fn is_ready(&self) -> bool {
        self.inner.outcome.lock().is_some()
    }

    /// Returns the outcome without blocking, if available.
    pub fn try_get(&self) -> Option<Result<T>> {
        self.inner.outcome.lock().clone()
    }

    /// Blocks until the outcome is available.
    pub fn wait(&self) -> Result<T> {
        let mut slot = self.inner.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.inner.ready.wait(&mut slot);
        }
    }

    /// Blocks for at most `timeout`. Returns `None` if the outcome is still
    /// missing when the timeout expires.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T>> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.inner.outcome.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return Some(outcome.clone());
            }
            if self.inner.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.clone();
            }
        }
    }
}

impl<T> SharedFuture<T> {
    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(Slot {
                outcome: Mutex::new(None),
                ready: Condvar::new(),
            }),
        }
    }

    /// Sets the outcome. Returns `false` if it was already set.
    pub(crate) fn complete(&self, outcome: Result<T>) -> bool {
        let mut slot = self.inner.outcome.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        self.inner.ready.notify_all();
        true
    }

    /// Returns `true` if both handles refer to the same execution.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for SharedFuture<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedFuture")
            .field("outcome", &*self.inner.outcome.lock())
            .finish()
    }
}
