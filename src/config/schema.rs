//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the load
//! balancer. All types derive Serde traits for deserialization from config
//! files. camelCase aliases are kept for the keys the legacy `lb.json`
//! format used (`stickySession`, `healthCheckInterval`, `sslConf`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default health-check interval applied when the configured value is
/// absent or non-positive.
pub const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 60_000;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default path probed by the `http` and `endpoint` checks.
pub const DEFAULT_HEALTH_CHECK_PATH: &str = "/health-check";

/// Operating mode of the balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Raw TCP byte relay.
    #[default]
    Tcp,
    /// HTTP reverse proxy with forwarding headers.
    Http,
}

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LbConfig {
    /// Proxying mode: `tcp` (default) or `http`.
    pub mode: Mode,

    /// Listen address. The default binds both IPv6 and IPv4.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// HTTP mode only: terminate TLS on the listener.
    pub secure: bool,

    /// TLS material for the listener when `secure` is set.
    #[serde(alias = "sslConf")]
    pub tls: Option<TlsConfig>,

    /// Bind client IPs to a single backend for the process lifetime.
    #[serde(alias = "stickySession")]
    pub sticky_session: bool,

    /// Milliseconds between health-check cycles. Absent or non-positive
    /// values fall back to [`DEFAULT_HEALTH_CHECK_INTERVAL_MS`].
    #[serde(alias = "healthCheckInterval")]
    pub health_check_interval_ms: Option<i64>,

    /// Maximum concurrent inbound connections (TCP mode backpressure).
    pub max_connections: usize,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Ordered backend server definitions. Fixed at startup.
    pub servers: Vec<ServerConfig>,
}

impl Default for LbConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Tcp,
            host: "::".to_string(),
            port: 8080,
            secure: false,
            tls: None,
            sticky_session: false,
            health_check_interval_ms: None,
            max_connections: 10_000,
            observability: ObservabilityConfig::default(),
            servers: Vec::new(),
        }
    }
}

impl LbConfig {
    /// Effective health-check interval, with the default applied when the
    /// configured value is missing or non-positive.
    pub fn health_check_interval(&self) -> Duration {
        match self.health_check_interval_ms {
            Some(ms) if ms > 0 => Duration::from_millis(ms as u64),
            _ => Duration::from_millis(DEFAULT_HEALTH_CHECK_INTERVAL_MS),
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    #[serde(alias = "cert")]
    pub cert_path: String,

    /// Path to private key file (PEM).
    #[serde(alias = "key")]
    pub key_path: String,
}

/// A single backend server definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Backend host name or address.
    pub host: String,

    /// Backend port.
    pub port: u16,

    /// Connect to this backend over HTTPS (HTTP mode / endpoint probe).
    #[serde(default)]
    pub secure: bool,

    /// Initial enabled state, before the first health cycle runs.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Optional health probe configuration. Backends without a recognized
    /// probe keep their `enabled` flag at its last value.
    pub check: Option<CheckConfig>,
}

fn default_enabled() -> bool {
    true
}

/// Health probe configuration for one backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckConfig {
    /// Probe kind: `port`, `http`, or `endpoint`. Anything else is skipped.
    #[serde(rename = "type")]
    pub kind: String,

    /// Port probe: alternative target port (defaults to the backend port).
    pub target: Option<u16>,

    /// Per-probe timeout in milliseconds (default 5000).
    #[serde(alias = "timeout")]
    pub timeout_ms: Option<u64>,

    /// HTTP probe path (default `/health-check`).
    pub path: Option<String>,

    /// Endpoint probe path (default `/health-check`).
    pub endpoint: Option<String>,

    /// HTTP probe scheme override (`http` or `https`).
    pub protocol: Option<String>,
}

impl CheckConfig {
    /// Effective probe timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS))
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose a Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Address the metrics exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_applied_when_absent_or_non_positive() {
        let mut config = LbConfig::default();
        assert_eq!(
            config.health_check_interval(),
            Duration::from_millis(DEFAULT_HEALTH_CHECK_INTERVAL_MS)
        );

        config.health_check_interval_ms = Some(0);
        assert_eq!(
            config.health_check_interval(),
            Duration::from_millis(DEFAULT_HEALTH_CHECK_INTERVAL_MS)
        );

        config.health_check_interval_ms = Some(-5);
        assert_eq!(
            config.health_check_interval(),
            Duration::from_millis(DEFAULT_HEALTH_CHECK_INTERVAL_MS)
        );

        config.health_check_interval_ms = Some(2500);
        assert_eq!(config.health_check_interval(), Duration::from_millis(2500));
    }

    #[test]
    fn camel_case_aliases_accepted() {
        let json = r#"{
            "mode": "http",
            "port": 9090,
            "stickySession": true,
            "healthCheckInterval": 1000,
            "servers": [
                { "host": "127.0.0.1", "port": 8000,
                  "check": { "type": "port", "timeout": 250 } }
            ]
        }"#;
        let config: LbConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mode, Mode::Http);
        assert!(config.sticky_session);
        assert_eq!(config.health_check_interval(), Duration::from_millis(1000));
        let check = config.servers[0].check.as_ref().unwrap();
        assert_eq!(check.kind, "port");
        assert_eq!(check.timeout(), Duration::from_millis(250));
    }
}
