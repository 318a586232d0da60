//! Agent configuration injected at startup.

use crate::url::{CollectorUrl, UrlError};

pub const DEFAULT_CYCLE_DELAY_MS: u32 = 2_000;
pub const DEFAULT_CONNECT_RETRY_MS: u32 = 1_000;
pub const DEFAULT_STATS_EVERY: u32 = 30;

/// Wi-Fi credentials source.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WifiConfig {
    pub ssid: &'static str,
    pub password: &'static str,
}

impl WifiConfig {
    pub const fn new(ssid: &'static str, password: &'static str) -> Self {
        Self { ssid, password }
    }
}

/// How long the initial association may keep retrying.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectPolicy {
    /// Never give up. An unattended device has no other way forward.
    Forever,
    /// Give up after this many attempts (at least one is always made).
    MaxAttempts(u32),
}

/// What a cycle does after observing a dropped association.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReconnectPolicy {
    /// Log and skip only; relies on the radio stack rejoining on its own.
    ObserveOnly,
    /// Also make one association attempt before the cycle delay.
    Reassociate,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AgentConfig {
    pub wifi: WifiConfig,
    pub collector_url: &'static str,
    pub cycle_delay_ms: u32,
    pub connect_retry_ms: u32,
    pub connect_policy: ConnectPolicy,
    pub reconnect_policy: ReconnectPolicy,
    /// Log a statistics line every N cycles; 0 disables.
    pub stats_every: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    EmptySsid,
    CollectorUrl(UrlError),
}

impl AgentConfig {
    pub const fn new(wifi: WifiConfig, collector_url: &'static str) -> Self {
        Self {
            wifi,
            collector_url,
            cycle_delay_ms: DEFAULT_CYCLE_DELAY_MS,
            connect_retry_ms: DEFAULT_CONNECT_RETRY_MS,
            connect_policy: ConnectPolicy::Forever,
            reconnect_policy: ReconnectPolicy::Reassociate,
            stats_every: DEFAULT_STATS_EVERY,
        }
    }

    pub const fn with_cycle_delay_ms(mut self, cycle_delay_ms: u32) -> Self {
        self.cycle_delay_ms = cycle_delay_ms;
        self
    }

    pub const fn with_connect_retry_ms(mut self, connect_retry_ms: u32) -> Self {
        self.connect_retry_ms = connect_retry_ms;
        self
    }

    pub const fn with_connect_policy(mut self, connect_policy: ConnectPolicy) -> Self {
        self.connect_policy = connect_policy;
        self
    }

    pub const fn with_reconnect_policy(mut self, reconnect_policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = reconnect_policy;
        self
    }

    pub const fn with_stats_every(mut self, stats_every: u32) -> Self {
        self.stats_every = stats_every;
        self
    }

    /// Checks the credentials and returns the parsed collector endpoint.
    pub fn validate(&self) -> Result<CollectorUrl, ConfigError> {
        if self.wifi.ssid.is_empty() {
            return Err(ConfigError::EmptySsid);
        }
        CollectorUrl::parse(self.collector_url).map_err(ConfigError::CollectorUrl)
    }
}
