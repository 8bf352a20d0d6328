//! Listener and event types shared by the delegate.
//!
//! [`Event`] is the per-invocation context a listener receives, and
//! [`Listener`] is the reference-counted callable the delegate stores.

use std::fmt;
use std::rc::Rc;

/// Priority assigned when a registration does not name one.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Context passed to a listener for one broadcast.
///
/// A fresh event is built for every (broadcast, listener) pair. Both flags
/// are set-only: once requested, stopping or self-removal cannot be undone
/// for the current invocation.
pub struct Event<'a, D> {
    data: &'a D,
    stop: bool,
    remove_self: bool,
}

impl<'a, D> Event<'a, D> {
    pub(crate) fn new(data: &'a D) -> Self {
        Self {
            data,
            stop: false,
            remove_self: false,
        }
    }

    /// Returns the broadcast payload.
    pub fn data(&self) -> &'a D {
        self.data
    }

    /// Stops propagation: listeners after this one do not run for the
    /// current broadcast.
    ///
    /// May be called any number of times.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Schedules removal of the current listener once it returns.
    ///
    /// May be called any number of times.
    pub fn remove_self(&mut self) {
        self.remove_self = true;
    }

    /// Whether propagation has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.stop
    }

    /// Whether the current listener will be removed after it returns.
    pub fn is_removing_self(&self) -> bool {
        self.remove_self
    }
}

impl<D: fmt::Debug> fmt::Debug for Event<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("data", self.data)
            .field("stop", &self.stop)
            .field("remove_self", &self.remove_self)
            .finish()
    }
}

/// A shared handle to a listener callback.
///
/// Cloning is cheap and clones compare equal: equality is identity of the
/// underlying callback, which is what
/// [`Delegate::remove_listener_fn`](super::Delegate::remove_listener_fn)
/// matches on.
///
/// # Examples
///
/// ```
/// use u_inventory::delegate::{Delegate, Listener};
///
/// let listener: Listener<u32> = Listener::new(|e| assert_eq!(*e.data(), 7));
/// let mut delegate: Delegate<u32> = Delegate::new();
/// delegate.add_listener_handle(listener.clone(), 0);
/// delegate.broadcast(&7);
///
/// delegate.remove_listener_fn(&listener);
/// assert!(delegate.is_empty());
/// ```
pub struct Listener<D>(Rc<dyn Fn(&mut Event<'_, D>)>);

impl<D> Listener<D> {
    /// Wraps a callback into a listener handle.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Event<'_, D>) + 'static,
    {
        Listener(Rc::new(f))
    }

    /// Invokes the callback.
    pub fn call(&self, event: &mut Event<'_, D>) {
        (self.0)(event)
    }

    /// Returns `true` if both handles refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<D> Clone for Listener<D> {
    fn clone(&self) -> Self {
        Listener(Rc::clone(&self.0))
    }
}

impl<D> PartialEq for Listener<D> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<D> Eq for Listener<D> {}

impl<D> fmt::Debug for Listener<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}
