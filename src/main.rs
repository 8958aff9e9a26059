//! TCP/HTTP load balancer.
//!
//! Routes inbound client connections to one of several backend servers.
//! The backend set is kept current by periodic health probing; targets are
//! picked per connection/request by round-robin rotation or
//! sticky-by-client-IP selection. Runs either as a raw TCP byte relay or
//! as an HTTP reverse proxy with forwarding headers.
//!
//! ```text
//!                    ┌───────────────────────────────────────────┐
//!                    │               LOAD BALANCER               │
//!                    │                                           │
//!   Client ──────────┼─▶ net::Listener ─▶ relay::TcpRelay ───────┼─▶ Backend
//!   (tcp mode)       │                        │                  │
//!                    │                   BackendSelector         │
//!   Client ──────────┼─▶ http::HttpServer ────┘                  │
//!   (http mode)      │                        ▲                  │
//!                    │                  BackendRegistry          │
//!                    │                        ▲                  │
//!                    │                 health::HealthMonitor     │
//!                    └───────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use load_balancer::balance::{BackendRegistry, BackendSelector};
use load_balancer::config::{self, Mode};
use load_balancer::health::HealthMonitor;
use load_balancer::http::HttpServer;
use load_balancer::lifecycle::{signals, Shutdown};
use load_balancer::net::{tls, Listener};
use load_balancer::observability::{logging, metrics};
use load_balancer::relay::TcpRelay;

#[derive(Parser, Debug)]
#[command(name = "load-balancer", about = "TCP/HTTP load balancer")]
struct Cli {
    /// Path to the configuration file (TOML or JSON).
    #[arg(short, long, default_value = "lb.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init();

    tracing::info!("Starting the load balancer");

    let config = config::load_config(&cli.config)?;

    tracing::info!(
        mode = ?config.mode,
        host = %config.host,
        port = config.port,
        sticky_session = config.sticky_session,
        backends = config.servers.len(),
        "Configuration loaded"
    );

    let registry = Arc::new(BackendRegistry::new(&config.servers));
    let selector = Arc::new(BackendSelector::new(
        Arc::clone(&registry),
        config.sticky_session,
    ));

    let shutdown = Shutdown::new();

    // Health cycles start immediately; the first one runs before the
    // first interval elapses.
    let monitor = HealthMonitor::new(Arc::clone(&registry), config.health_check_interval());
    let monitor_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        monitor.run(monitor_shutdown).await;
    });

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(error) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    error = %error,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let engine_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    match config.mode {
        Mode::Tcp => {
            let listener =
                Listener::bind(&config.host, config.port, config.max_connections).await?;
            TcpRelay::new(selector).run(listener, engine_shutdown).await?;
        }
        Mode::Http => {
            run_http(&config, selector, engine_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Start the HTTP engine, terminating TLS when configured and the
/// certificate material loads. A certificate load failure logs the error
/// and falls back to plain HTTP rather than aborting startup.
async fn run_http(
    config: &config::LbConfig,
    selector: Arc<BackendSelector>,
    shutdown: tokio::sync::broadcast::Receiver<()>,
) -> Result<(), Box<dyn std::error::Error>> {
    if config.secure {
        if let Some(tls_config) = &config.tls {
            match tls::load_tls_config(
                tls_config.cert_path.as_ref(),
                tls_config.key_path.as_ref(),
            )
            .await
            {
                Ok(rustls) => {
                    tracing::info!("TLS termination enabled");
                    let addr = tokio::net::lookup_host((config.host.as_str(), config.port))
                        .await?
                        .next()
                        .ok_or("listen address did not resolve")?;
                    let server = HttpServer::new(selector, true);
                    server.run_tls(addr, rustls, shutdown).await?;
                    return Ok(());
                }
                Err(error) => {
                    tracing::error!(
                        error = %error,
                        "Failed to load TLS certificates, falling back to HTTP"
                    );
                }
            }
        }
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let server = HttpServer::new(selector, false);
    server.run(listener, shutdown).await?;
    Ok(())
}
