//! Effective runtime settings: config file values with command-line
//! overrides applied on top.

use {
    sigrelay_channels::GroupSelector,
    sigrelay_config::{SigrelayConfig, SignalConfig},
    sigrelay_signal::SignalAccountConfig,
};

/// Values given on the command line or through `SIGRELAY_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub account: Option<String>,
    pub group: Option<String>,
    pub api_url: Option<String>,
}

impl Overrides {
    pub fn apply(&self, mut config: SigrelayConfig) -> SigrelayConfig {
        if let Some(account) = non_blank(self.account.as_deref()) {
            config.signal.account = Some(account.to_string());
        }
        if let Some(api_url) = non_blank(self.api_url.as_deref()) {
            config.signal.api_url = api_url.to_string();
        }
        if let Some(group) = non_blank(self.group.as_deref()) {
            config.bot.control_group_id = Some(group.to_string());
        }
        config
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub signal: SignalAccountConfig,
    pub control_group: GroupSelector,
}

impl Settings {
    /// Fails when no account number is configured anywhere.
    pub fn resolve(config: &SigrelayConfig) -> Option<Self> {
        let SignalConfig {
            api_url,
            account,
            receive_timeout_secs,
            request_timeout_secs,
            poll_backoff_secs,
        } = &config.signal;
        let account = non_blank(account.as_deref())?;

        let control_group = match non_blank(config.bot.control_group_id.as_deref()) {
            Some(id) => GroupSelector::Id(id.to_string()),
            None => GroupSelector::Name(config.bot.control_group_name.clone()),
        };

        Some(Self {
            signal: SignalAccountConfig {
                api_url: api_url.clone(),
                account: account.to_string(),
                receive_timeout_secs: *receive_timeout_secs,
                request_timeout_secs: *request_timeout_secs,
                poll_backoff_secs: *poll_backoff_secs,
            },
            control_group,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
