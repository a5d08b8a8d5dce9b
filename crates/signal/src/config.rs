use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for one Signal account on a signal-cli REST daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalAccountConfig {
    /// Base URL of the daemon, e.g. `http://127.0.0.1:8080`.
    pub api_url: String,

    /// Registered account number, E.164.
    pub account: String,

    /// Long-poll timeout for `/v1/receive` (seconds).
    pub receive_timeout_secs: u64,

    /// HTTP client timeout for every request (seconds). Kept above the
    /// long-poll timeout so the client never aborts a healthy poll.
    pub request_timeout_secs: u64,

    /// Pause after a failed poll (seconds).
    pub poll_backoff_secs: u64,
}

impl Default for SignalAccountConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".into(),
            account: String::new(),
            receive_timeout_secs: 10,
            request_timeout_secs: 60,
            poll_backoff_secs: 5,
        }
    }
}

impl SignalAccountConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(self.receive_timeout_secs + 5))
    }

    pub fn poll_backoff(&self) -> Duration {
        Duration::from_secs(self.poll_backoff_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_timeout_never_undercuts_long_poll() {
        let cfg = SignalAccountConfig {
            receive_timeout_secs: 30,
            request_timeout_secs: 10,
            ..Default::default()
        };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(35));
        assert_eq!(
            SignalAccountConfig::default().request_timeout(),
            Duration::from_secs(60)
        );
    }
}
