//! Error types for u-inventory.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the utilities in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument violated the operation's precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A pending throttled execution was discarded before it ran.
    #[error("pending execution was cancelled")]
    Cancelled,

    /// The throttled action panicked while running on the timer thread.
    #[error("throttled action panicked: {0}")]
    ActionPanicked(String),

    /// The background timer thread could not be started.
    #[error("timer thread unavailable: {0}")]
    TimerUnavailable(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
