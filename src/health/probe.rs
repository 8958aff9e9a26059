//! Health probe implementations.
//!
//! # Responsibilities
//! - Execute one probe against one backend
//! - Resolve every outcome (success, connect error, timeout, bad status)
//!   to a boolean written to the backend's enabled flag
//!
//! # Design Decisions
//! - Probes never propagate errors; a failed probe is a health result,
//!   not a process error
//! - Backends with an unrecognized probe kind are skipped and keep their
//!   last known state

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time;

use crate::balance::Backend;
use crate::config::schema::DEFAULT_HEALTH_CHECK_PATH;
use crate::observability::metrics;

/// Run the configured probe for one backend and record the result.
///
/// Backends without a check, or with an unrecognized check kind, are left
/// untouched.
pub async fn execute(backend: &Backend, client: &reqwest::Client) {
    let Some(check) = &backend.check else {
        return;
    };

    let healthy = match check.kind.as_str() {
        "port" => {
            let port = check.target.unwrap_or(backend.port);
            port_probe(&backend.host, port, check.timeout()).await
        }
        "http" => {
            let scheme = match check.protocol.as_deref() {
                Some("https") => "https",
                _ => "http",
            };
            let path = check.path.as_deref().unwrap_or(DEFAULT_HEALTH_CHECK_PATH);
            let url = format!("{}://{}{}", scheme, backend.authority(), path);
            http_probe(client, &url, check.timeout()).await
        }
        "endpoint" => {
            let path = check
                .endpoint
                .as_deref()
                .unwrap_or(DEFAULT_HEALTH_CHECK_PATH);
            let url = format!("{}{}", backend.base_url(), path);
            http_probe(client, &url, check.timeout()).await
        }
        other => {
            tracing::trace!(
                backend = %backend.authority(),
                kind = other,
                "Unrecognized probe kind, skipping"
            );
            return;
        }
    };

    if healthy {
        tracing::debug!(backend = %backend.authority(), kind = %check.kind, "Probe succeeded");
    } else {
        tracing::warn!(backend = %backend.authority(), kind = %check.kind, "Probe failed");
    }

    backend.set_enabled(healthy);
    metrics::record_backend_health(&backend.authority(), healthy);
}

/// TCP connect probe. Success is a completed handshake within the timeout;
/// the socket is dropped immediately afterwards.
async fn port_probe(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}

/// HTTP GET probe. Success is a response with a 2xx status within the
/// timeout; connect errors, timeouts, and non-2xx statuses all fail.
async fn http_probe(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    match client.get(url).timeout(timeout).send().await {
        Ok(response) => {
            let healthy = response.status().is_success();
            if !healthy {
                tracing::debug!(url, status = %response.status(), "Probe got non-2xx status");
            }
            healthy
        }
        Err(error) => {
            tracing::debug!(url, error = %error, "Probe request failed");
            false
        }
    }
}
