//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, timeouts)
//! - Check TLS material is present when TLS is requested
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: LbConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use crate::config::schema::{LbConfig, Mode};

/// A single validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no backend servers configured")]
    NoServers,

    #[error("server {index}: host must not be empty")]
    EmptyHost { index: usize },

    #[error("server {index}: port must not be zero")]
    ZeroPort { index: usize },

    #[error("server {index}: probe timeout must be greater than zero")]
    ZeroProbeTimeout { index: usize },

    #[error("listen port must not be zero")]
    ZeroListenPort,

    #[error("secure listener requested but no TLS material configured")]
    MissingTls,
}

/// Validate a loaded configuration, collecting every failure.
pub fn validate_config(config: &LbConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    if config.port == 0 {
        errors.push(ValidationError::ZeroListenPort);
    }

    if config.secure && config.mode == Mode::Http && config.tls.is_none() {
        errors.push(ValidationError::MissingTls);
    }

    for (index, server) in config.servers.iter().enumerate() {
        if server.host.is_empty() {
            errors.push(ValidationError::EmptyHost { index });
        }
        if server.port == 0 {
            errors.push(ValidationError::ZeroPort { index });
        }
        if let Some(check) = &server.check {
            if check.timeout_ms == Some(0) {
                errors.push(ValidationError::ZeroProbeTimeout { index });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
