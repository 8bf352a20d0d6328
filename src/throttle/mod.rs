//! Throttled actions.
//!
//! A [`ThrottledAction`] wraps a zero-argument action and runs it at most
//! once per interval when requested through
//! [`urge`](ThrottledAction::urge). Requests that arrive while an execution
//! is pending are coalesced into it and share its [`SharedFuture`].
//!
//! # Key Types
//!
//! - [`ThrottledAction`]: the rate limiter
//! - [`ThrottleConfig`]: interval and timer thread name
//! - [`SharedFuture`]: write-once result shared by coalesced requests
//!
//! Each action owns one background timer thread, started lazily on the
//! first deferred execution and stopped by
//! [`shutdown`](ThrottledAction::shutdown) or drop.

mod action;
mod config;
mod future;
mod timer;

pub use action::ThrottledAction;
pub use config::ThrottleConfig;
pub use future::SharedFuture;
