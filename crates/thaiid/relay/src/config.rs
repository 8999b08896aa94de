//! Relay settings

use std::time::Duration;

use thaiid_bridge::config::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};

/// Delays and retry bounds of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayTimings {
    /// Pause between two read attempts
    pub retry_delay: Duration,
    /// Read attempts before reporting that no card was found
    pub max_attempts: usize,
    /// Pause after closing and after re-enumerating during a reconnect
    pub reconnect_delay: Duration,
    /// Pause between the reader becoming ready and an automatic read
    pub auto_read_delay: Duration,
    /// Pause between clearing data and an automatic read
    pub clear_read_delay: Duration,
}

impl Default for RelayTimings {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(1),
            max_attempts: 3,
            reconnect_delay: Duration::from_millis(500),
            auto_read_delay: Duration::from_millis(500),
            clear_read_delay: Duration::from_secs(1),
        }
    }
}

impl RelayTimings {
    /// Every delay set to `delay`, for tests
    pub const fn uniform(delay: Duration) -> Self {
        Self {
            retry_delay: delay,
            max_attempts: 3,
            reconnect_delay: delay,
            auto_read_delay: delay,
            clear_read_delay: delay,
        }
    }
}

/// Settings of a [`Relay`](crate::Relay)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Device id used for every bridge
    pub device_id: String,
    /// API key used for every bridge
    pub api_key: String,
    /// Poll interval of every bridge
    pub poll_interval: Duration,
    /// Request timeout of every bridge
    pub request_timeout: Duration,
    /// Initial auto-read flag
    pub auto_read: bool,
    /// Delays and retry bounds
    pub timings: RelayTimings,
}

impl RelayConfig {
    /// Settings with default timings and auto-read off
    pub fn new(device_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            api_key: api_key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            auto_read: false,
            timings: RelayTimings::default(),
        }
    }

    /// Set the bridge poll interval
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the bridge request timeout
    pub const fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the initial auto-read flag
    pub const fn with_auto_read(mut self, auto_read: bool) -> Self {
        self.auto_read = auto_read;
        self
    }

    /// Set the timings
    pub const fn with_timings(mut self, timings: RelayTimings) -> Self {
        self.timings = timings;
        self
    }
}
