//! Prioritized event delegation.
//!
//! A [`Delegate`] holds listeners ordered by priority and invokes them
//! synchronously on every [`broadcast`](Delegate::broadcast). Listeners
//! receive an [`Event`] through which they can stop propagation or remove
//! themselves.
//!
//! # Key Types
//!
//! - [`Delegate`]: the listener registry and broadcast loop
//! - [`Event`]: per-invocation context (payload, stop, remove-self)
//! - [`Listener`]: shared callback handle, comparable by identity
//!
//! # Ordering
//!
//! Higher priority runs first; equal priorities run in registration order.
//! Re-registering a key removes the previous listener and inserts the new
//! one by its own priority.

mod registry;
mod types;

pub use registry::Delegate;
pub use types::{Event, Listener, DEFAULT_PRIORITY};
