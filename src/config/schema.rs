//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the daemon.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the failover daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FailoverConfig {
    /// Heartbeat cadence settings.
    pub ping: PingConfig,

    /// Seconds a link must go without a connectivity event before it is
    /// considered stable.
    pub min_uptime: MinUptime,

    /// Uplinks in priority order (first entry is the most preferred).
    #[serde(alias = "servers")]
    pub links: Vec<LinkConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl FailoverConfig {
    /// Stability debounce as a [`Duration`].
    pub fn min_uptime(&self) -> Duration {
        Duration::from_secs(self.min_uptime.0)
    }
}

/// Wrapper so `min_uptime` gets its own default when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MinUptime(pub u64);

impl Default for MinUptime {
    fn default() -> Self {
        Self(900)
    }
}

/// Heartbeat probe timing, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PingConfig {
    /// Probe period for the link that is active when monitoring starts.
    pub active: u64,

    /// Probe period for idle links.
    pub idle: u64,

    /// Time allowed for a probe response.
    pub pong_wait: u64,
}

impl PingConfig {
    pub fn active_period(&self) -> Duration {
        Duration::from_secs(self.active)
    }

    pub fn idle_period(&self) -> Duration {
        Duration::from_secs(self.idle)
    }

    pub fn pong_wait(&self) -> Duration {
        Duration::from_secs(self.pong_wait)
    }
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            active: 10,
            idle: 60,
            pong_wait: 5,
        }
    }
}

/// A single WAN uplink.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkConfig {
    /// Heartbeat endpoint reachable through this uplink (e.g., "10.0.0.1:8080").
    #[serde(alias = "ws_url")]
    pub address: String,

    /// Whether this link is routed when the daemon starts.
    #[serde(default)]
    pub is_active: bool,

    /// Argument vector executed to make this link the routed path.
    #[serde(default)]
    pub command: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_to_minimal_document() {
        let config: FailoverConfig = toml::from_str(
            r#"
            [[links]]
            address = "10.0.0.1:8080"
            is_active = true
            command = ["true"]
            "#,
        )
        .unwrap();

        assert_eq!(config.ping.active, 10);
        assert_eq!(config.ping.idle, 60);
        assert_eq!(config.ping.pong_wait, 5);
        assert_eq!(config.min_uptime(), Duration::from_secs(900));
        assert_eq!(config.links.len(), 1);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let config: FailoverConfig = toml::from_str(
            r#"
            min_uptime = 30

            [ping]
            active = 2

            [[servers]]
            ws_url = "10.0.0.1:8080"
            command = ["true"]
            "#,
        )
        .unwrap();

        assert_eq!(config.min_uptime.0, 30);
        assert_eq!(config.ping.active, 2);
        assert_eq!(config.ping.idle, 60);
        assert_eq!(config.links[0].address, "10.0.0.1:8080");
        assert!(!config.links[0].is_active);
    }
}
