//! Throttle configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for a [`ThrottledAction`](super::ThrottledAction).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_inventory::throttle::ThrottleConfig;
///
/// let config = ThrottleConfig::default()
///     .with_interval(Duration::from_millis(250))
///     .with_thread_name("autosave");
/// assert!(config.validate().is_ok());
/// assert_eq!(config.interval, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThrottleConfig {
    /// Minimum time between two throttled executions. Must be non-zero.
    pub interval: Duration,

    /// Name of the background timer thread.
    pub thread_name: String,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            thread_name: "throttled-action".into(),
        }
    }
}

impl ThrottleConfig {
    /// Sets the minimum interval between executions.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the timer thread name.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::invalid("interval must be positive"));
        }
        if self.thread_name.is_empty() {
            return Err(Error::invalid("thread_name must not be empty"));
        }
        if self.thread_name.contains('\0') {
            return Err(Error::invalid("thread_name must not contain NUL bytes"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ThrottleConfig::default();
        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.thread_name, "throttled-action");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_interval() {
        let config = ThrottleConfig::default().with_interval(Duration::ZERO);
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_validate_bad_thread_name() {
        assert!(ThrottleConfig::default()
            .with_thread_name("")
            .validate()
            .is_err());
        assert!(ThrottleConfig::default()
            .with_thread_name("a\0b")
            .validate()
            .is_err());
    }
}
