//! Small building blocks for interactive applications.
//!
//! - **Delegate**: prioritized, keyed event dispatch with one-shot,
//!   self-removing and propagation-stopping listeners.
//! - **ThrottledAction**: runs an action at most once per interval,
//!   coalescing requests that arrive while an execution is pending.
//! - **Zone**: closed numeric interval with distance, containment and
//!   set operations.
//! - **MonoList**: monotonic sequences with nearest-value lookup and
//!   stepping.
//! - **lerp**: linear interpolation, including wrap-around for angles.
//!
//! # Architecture
//!
//! Every module is standalone. [`delegate`] is single-threaded and holds its
//! listeners behind `Rc`; [`throttle`] is thread-safe and owns a lazily
//! started timer thread per action. Fallible operations return
//! [`Result`] with the crate-wide [`Error`].

pub mod delegate;
pub mod error;
pub mod lerp;
pub mod monolist;
pub mod throttle;
pub mod zone;

pub use error::{Error, Result};
