//! TCP relay engine.
//!
//! # Responsibilities
//! - Accept inbound TCP connections
//! - Select a backend per connection and open an outbound connection
//! - Relay bytes verbatim in both directions until either side closes
//!
//! # Design Decisions
//! - One duplex copy loop per connection pair
//!   (`tokio::io::copy_bidirectional`): half-close on one side propagates
//!   a shutdown to the other; an error on either side tears both down
//! - Backend addresses are copied at selection time; a connection never
//!   holds registry state
//! - Failures are contained per connection and never affect the accept
//!   loop or other connections

use std::sync::Arc;

use tokio::io::copy_bidirectional;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::balance::BackendSelector;
use crate::net::{ConnectionPermit, Listener, ListenerError};
use crate::observability::metrics;

/// The raw TCP relaying engine.
pub struct TcpRelay {
    selector: Arc<BackendSelector>,
}

impl TcpRelay {
    pub fn new(selector: Arc<BackendSelector>) -> Self {
        Self { selector }
    }

    /// Accept connections until the shutdown signal fires.
    ///
    /// Accept errors on individual connections are logged and do not stop
    /// the loop; only shutdown ends it.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((client, peer, permit)) => {
                            let selector = Arc::clone(&self.selector);
                            tokio::spawn(async move {
                                handle_connection(client, peer, permit, selector).await;
                            });
                        }
                        Err(error) => {
                            tracing::error!(error = %error, "Accept failed");
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("TCP relay received shutdown signal, exiting loop");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Relay a single client connection to its selected backend.
///
/// Dropping both streams on any exit path is the forced-teardown
/// guarantee: no half of the pair is ever left dangling.
async fn handle_connection(
    mut client: TcpStream,
    peer: std::net::SocketAddr,
    _permit: ConnectionPermit,
    selector: Arc<BackendSelector>,
) {
    let Some(backend) = selector.select(peer.ip()) else {
        tracing::error!(peer = %peer, "No backend available, dropping connection");
        return;
    };

    let addr = (backend.host.clone(), backend.port);
    let mut upstream = match TcpStream::connect(addr).await {
        Ok(stream) => {
            tracing::debug!(
                peer = %peer,
                backend = %backend.authority(),
                "Relay established"
            );
            stream
        }
        Err(error) => {
            // Client is dropped here, tearing the inbound side down.
            tracing::warn!(
                peer = %peer,
                backend = %backend.authority(),
                error = %error,
                "Backend connection failed"
            );
            return;
        }
    };

    metrics::record_relay_connection(&backend.authority());

    match copy_bidirectional(&mut client, &mut upstream).await {
        Ok((to_backend, to_client)) => {
            tracing::debug!(
                peer = %peer,
                backend = %backend.authority(),
                bytes_up = to_backend,
                bytes_down = to_client,
                "Relay closed"
            );
        }
        Err(error) => {
            tracing::debug!(
                peer = %peer,
                backend = %backend.authority(),
                error = %error,
                "Relay aborted"
            );
        }
    }
}
