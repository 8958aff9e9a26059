//! Backend registry.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of configured backends
//! - Maintain the derived "valid backends" snapshot (currently enabled)
//! - Guarantee snapshot atomicity: selection never observes a torn update
//!
//! # Design Decisions
//! - The valid subset is an `ArcSwap`'d vector, rebuilt exactly once per
//!   completed health cycle. Readers hold a cheap snapshot; the health
//!   cycle swaps in a fully-built replacement.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::balance::backend::Backend;
use crate::config::ServerConfig;

/// Registry of all configured backends plus the enabled subset.
#[derive(Debug)]
pub struct BackendRegistry {
    /// Every configured backend, in configuration order. Fixed at startup.
    all: Vec<Arc<Backend>>,
    /// Snapshot of currently-enabled backends, in configuration order.
    valid: ArcSwap<Vec<Arc<Backend>>>,
}

impl BackendRegistry {
    /// Build the registry from configuration. The initial valid subset
    /// reflects the configured `enabled` flags; the first health cycle
    /// rebuilds it immediately at startup.
    pub fn new(servers: &[ServerConfig]) -> Self {
        let all: Vec<Arc<Backend>> = servers
            .iter()
            .map(|s| Arc::new(Backend::new(s)))
            .collect();
        let valid: Vec<Arc<Backend>> = all
            .iter()
            .filter(|b| b.is_enabled())
            .cloned()
            .collect();
        Self {
            all,
            valid: ArcSwap::from_pointee(valid),
        }
    }

    /// The fixed, ordered sequence of all configured backends.
    pub fn all_backends(&self) -> &[Arc<Backend>] {
        &self.all
    }

    /// Snapshot of the backends whose `enabled` flag is currently true.
    ///
    /// The snapshot is immutable; it reflects the most recently completed
    /// health cycle, never a partial one.
    pub fn valid_backends(&self) -> Arc<Vec<Arc<Backend>>> {
        self.valid.load_full()
    }

    /// Recompute the valid subset from the enabled flags.
    ///
    /// Called by the health subsystem exactly once per cycle, after every
    /// probe in the cycle has finished.
    pub fn rebuild_valid(&self) {
        let valid: Vec<Arc<Backend>> = self
            .all
            .iter()
            .filter(|b| b.is_enabled())
            .cloned()
            .collect();
        self.valid.store(Arc::new(valid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers(n: usize) -> Vec<ServerConfig> {
        (0..n)
            .map(|i| ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000 + i as u16,
                secure: false,
                enabled: true,
                check: None,
            })
            .collect()
    }

    #[test]
    fn valid_subset_tracks_enabled_flags() {
        let registry = BackendRegistry::new(&servers(3));
        assert_eq!(registry.valid_backends().len(), 3);

        registry.all_backends()[1].set_enabled(false);
        // Snapshot does not move until the cycle completes.
        assert_eq!(registry.valid_backends().len(), 3);

        registry.rebuild_valid();
        let valid = registry.valid_backends();
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].port, 8000);
        assert_eq!(valid[1].port, 8002);
    }

    #[test]
    fn snapshot_is_stable_across_rebuilds() {
        let registry = BackendRegistry::new(&servers(2));
        let snapshot = registry.valid_backends();

        registry.all_backends()[0].set_enabled(false);
        registry.rebuild_valid();

        // The old snapshot still holds both backends; new reads see one.
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.valid_backends().len(), 1);
    }

    #[test]
    fn initially_disabled_backend_excluded() {
        let mut configs = servers(2);
        configs[0].enabled = false;
        let registry = BackendRegistry::new(&configs);
        let valid = registry.valid_backends();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].port, 8001);
    }
}
