//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single configured backend server
//! - Hold the health-derived `enabled` flag
//! - Build addresses/URLs for connecting and probing

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{CheckConfig, ServerConfig};

/// A single backend server.
///
/// Identity (host + port) is fixed for the process lifetime; `enabled` is
/// the only mutable field and is written exclusively by the health
/// subsystem. The runtime is multi-threaded, so the flag is atomic.
#[derive(Debug)]
pub struct Backend {
    /// Backend host name or address.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Connect to this backend over HTTPS.
    pub secure: bool,
    /// Health probe configuration, if any.
    pub check: Option<CheckConfig>,
    /// Current health state.
    enabled: AtomicBool,
}

impl Backend {
    /// Create a backend from its configuration entry.
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            secure: config.secure,
            check: config.check.clone(),
            enabled: AtomicBool::new(config.enabled),
        }
    }

    /// Whether this backend is currently considered healthy.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Record a health probe outcome. Called only by the health subsystem.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// `host:port` form used for connecting and logging.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL for HTTP traffic, scheme chosen by the `secure` flag.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}
