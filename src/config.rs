//! Configuration for the session lifecycle core

use std::time::Duration;

/// Session core configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key under which the serialized session is stored in the secret store
    pub session_key: String,

    /// Key for the unencrypted first-run marker
    pub first_run_key: String,

    /// Debounce window for raw connectivity events
    pub debounce_window: Duration,

    /// Extra retry attempts after the first try (3 total attempts by default)
    pub max_retries: u32,

    /// Base delay between retries; attempt n waits `base * (n + 1)`
    pub retry_base_delay: Duration,

    /// Abandon any outbound remote call after this long and treat it as a
    /// transient network failure
    pub remote_timeout: Duration,

    /// Orchestrator mailbox capacity
    pub mailbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Create config with sensible defaults
    pub fn new() -> Self {
        Self {
            session_key: "fadebook.auth.session".to_string(),
            first_run_key: "fadebook.first_run".to_string(),
            debounce_window: Duration::from_millis(1000),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(1000),
            remote_timeout: Duration::from_secs(15),
            mailbox_capacity: 64,
        }
    }

    /// Widen the debounce window for platform classes where reachability
    /// events arrive with higher latency and burstier
    pub fn with_high_latency_platform(mut self) -> Self {
        self.debounce_window = Duration::from_millis(2000);
        self
    }

    /// Override the debounce window directly
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Override the retry budget (extra attempts after the first)
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Override the base retry delay
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Override the outbound remote call timeout
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Override the storage key for the session record
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }
}
