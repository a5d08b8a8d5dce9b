/// Config schema types.
use serde::{Deserialize, Serialize};

/// Name the control group is looked up by when no id is given.
pub const DEFAULT_CONTROL_GROUP_NAME: &str = "Command & Control";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigrelayConfig {
    pub signal: SignalConfig,
    pub bot: BotConfig,
}

/// Connection to the signal-cli REST API daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Base URL of the daemon.
    pub api_url: String,
    /// Account number (E.164). The `--account` flag takes precedence.
    pub account: Option<String>,
    /// Long-poll timeout passed to `/v1/receive`.
    pub receive_timeout_secs: u64,
    /// HTTP client timeout for every request. Must exceed the long-poll timeout.
    pub request_timeout_secs: u64,
    /// Pause after a failed receive before polling again.
    pub poll_backoff_secs: u64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".into(),
            account: None,
            receive_timeout_secs: 10,
            request_timeout_secs: 60,
            poll_backoff_secs: 5,
        }
    }
}

/// Control group selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub control_group_name: String,
    /// Takes precedence over the name. The `--group` flag overrides both.
    pub control_group_id: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            control_group_name: DEFAULT_CONTROL_GROUP_NAME.into(),
            control_group_id: None,
        }
    }
}
