//! Backend selection policy.
//!
//! # Responsibilities
//! - Round-robin rotation over the current valid subset
//! - Sticky-by-client-IP affinity when enabled
//! - Degraded-mode fallback when no backend is valid
//!
//! # Design Decisions
//! - The rotation cursor is a raw shared position, wrapped modulo the
//!   current valid count. It is not re-derived from backend identity, so a
//!   shrinking or growing valid set may skip or repeat a backend; round
//!   robin is a fairness heuristic, not an exact-cycle guarantee.
//! - A sticky mapping whose backend is currently disabled is rebound via
//!   round robin instead of returning a known-dead backend forever.
//! - Routing-table entries never expire; unbounded growth is accepted.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::balance::backend::Backend;
use crate::balance::registry::BackendRegistry;
use crate::observability::metrics;

/// Picks a backend for each new connection or request.
#[derive(Debug)]
pub struct BackendSelector {
    registry: Arc<BackendRegistry>,
    /// Shared rotation position, advanced on every round-robin pick.
    cursor: AtomicUsize,
    /// Client IP → backend affinity map; present only in sticky mode.
    routing_table: Option<DashMap<IpAddr, Arc<Backend>>>,
}

impl BackendSelector {
    pub fn new(registry: Arc<BackendRegistry>, sticky_session: bool) -> Self {
        Self {
            registry,
            cursor: AtomicUsize::new(0),
            routing_table: sticky_session.then(DashMap::new),
        }
    }

    /// Select the backend for the given client.
    ///
    /// Returns `None` only when no backends are configured at all, which
    /// config validation rejects before startup.
    pub fn select(&self, client_ip: IpAddr) -> Option<Arc<Backend>> {
        let Some(table) = &self.routing_table else {
            return self.round_robin();
        };

        if let Some(entry) = table.get(&client_ip) {
            let backend = Arc::clone(entry.value());
            drop(entry);
            if backend.is_enabled() {
                return Some(backend);
            }
            tracing::debug!(
                client = %client_ip,
                backend = %backend.authority(),
                "Sticky backend unhealthy, rebinding"
            );
        }

        let backend = self.round_robin()?;
        table.insert(client_ip, Arc::clone(&backend));
        tracing::debug!(
            client = %client_ip,
            backend = %backend.authority(),
            "Sticky session bound"
        );
        Some(backend)
    }

    /// Advance the rotation cursor and return the next valid backend.
    ///
    /// With an empty valid set this falls back to the first configured
    /// backend: a deliberate availability-over-correctness choice, and it
    /// may hand out a backend known to be unhealthy.
    fn round_robin(&self) -> Option<Arc<Backend>> {
        let valid = self.registry.valid_backends();
        if valid.is_empty() {
            let fallback = self.registry.all_backends().first().cloned();
            if let Some(backend) = &fallback {
                tracing::warn!(
                    backend = %backend.authority(),
                    "No valid backends, falling back to first configured"
                );
                metrics::record_fallback_selection();
            }
            return fallback;
        }

        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % valid.len();
        Some(Arc::clone(&valid[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn registry(n: usize) -> Arc<BackendRegistry> {
        let servers: Vec<ServerConfig> = (0..n)
            .map(|i| ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000 + i as u16,
                secure: false,
                enabled: true,
                check: None,
            })
            .collect();
        Arc::new(BackendRegistry::new(&servers))
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn round_robin_cycles_in_configured_order() {
        let selector = BackendSelector::new(registry(3), false);

        let picks: Vec<u16> = (0..6)
            .map(|_| selector.select(ip(1)).unwrap().port)
            .collect();
        assert_eq!(picks, vec![8000, 8001, 8002, 8000, 8001, 8002]);
    }

    #[test]
    fn round_robin_even_distribution() {
        let selector = BackendSelector::new(registry(3), false);

        let mut counts = [0usize; 3];
        for _ in 0..30 {
            let port = selector.select(ip(1)).unwrap().port;
            counts[(port - 8000) as usize] += 1;
        }
        assert_eq!(counts, [10, 10, 10]);
    }

    #[test]
    fn disabled_backend_skipped_after_rebuild() {
        let registry = registry(2);
        registry.all_backends()[0].set_enabled(false);
        registry.rebuild_valid();

        let selector = BackendSelector::new(Arc::clone(&registry), false);
        assert_eq!(registry.valid_backends().len(), 1);
        for _ in 0..4 {
            assert_eq!(selector.select(ip(1)).unwrap().port, 8001);
        }
    }

    #[test]
    fn empty_valid_set_falls_back_to_first_configured() {
        let registry = registry(2);
        for backend in registry.all_backends() {
            backend.set_enabled(false);
        }
        registry.rebuild_valid();

        let selector = BackendSelector::new(Arc::clone(&registry), false);
        let backend = selector.select(ip(1)).unwrap();
        assert_eq!(backend.port, 8000);
        assert!(!backend.is_enabled());
    }

    #[test]
    fn no_backends_yields_none() {
        let selector = BackendSelector::new(Arc::new(BackendRegistry::new(&[])), false);
        assert!(selector.select(ip(1)).is_none());
    }

    #[test]
    fn sticky_client_keeps_its_backend() {
        let selector = BackendSelector::new(registry(3), true);

        let first = selector.select(ip(1)).unwrap();
        // Interleave selections for other clients to advance the cursor.
        for other in 2..10 {
            selector.select(ip(other)).unwrap();
        }
        for _ in 0..5 {
            assert_eq!(selector.select(ip(1)).unwrap().port, first.port);
        }
    }

    #[test]
    fn sticky_mapping_rebinds_when_backend_disabled() {
        let registry = registry(2);
        let selector = BackendSelector::new(Arc::clone(&registry), true);

        let first = selector.select(ip(1)).unwrap();
        first.set_enabled(false);
        registry.rebuild_valid();

        let rebound = selector.select(ip(1)).unwrap();
        assert_ne!(rebound.port, first.port);
        assert!(rebound.is_enabled());

        // The new binding is itself sticky.
        assert_eq!(selector.select(ip(1)).unwrap().port, rebound.port);
    }

    #[test]
    fn distinct_clients_spread_across_backends() {
        let selector = BackendSelector::new(registry(2), true);

        let a = selector.select(ip(1)).unwrap();
        let b = selector.select(ip(2)).unwrap();
        assert_ne!(a.port, b.port);
    }
}
