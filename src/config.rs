//! Runtime tuning for the sprint board.

use std::time::Duration;

/// Configuration for the sprint board and its ownership engine.
///
/// # Examples
///
/// ```
/// use sprintboard::config::BoardConfig;
/// use std::time::Duration;
///
/// let config = BoardConfig::default();
/// assert_eq!(config.request_timeout, Duration::from_secs(10));
///
/// let strict = BoardConfig::strict();
/// assert!(strict.request_timeout < config.request_timeout);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Longest wait for one persistence service call before the call is
    /// treated as a transport failure.
    pub request_timeout: Duration,
    /// Capacity of the push message queue.
    pub push_queue_capacity: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            push_queue_capacity: 256,
        }
    }
}

impl BoardConfig {
    /// Creates a configuration with short waits.
    ///
    /// Useful on fast local networks and in tests.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            request_timeout: Duration::from_secs(2),
            push_queue_capacity: 64,
        }
    }

    /// Sets the persistence call timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the push queue capacity.
    #[must_use]
    pub const fn with_push_queue_capacity(mut self, capacity: usize) -> Self {
        self.push_queue_capacity = capacity;
        self
    }
}
