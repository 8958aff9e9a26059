//! Periodic health-check cycle driver.
//!
//! # Responsibilities
//! - Tick on the configured interval, with an immediate first cycle
//! - Fan out all probes concurrently and wait for every one to finish
//! - Rebuild the valid-backend snapshot exactly once per completed cycle

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::broadcast;
use tokio::time;

use crate::balance::BackendRegistry;
use crate::health::probe;

/// Drives the health-check cycles for the whole backend set.
pub struct HealthMonitor {
    registry: Arc<BackendRegistry>,
    interval: Duration,
    client: reqwest::Client,
}

impl HealthMonitor {
    pub fn new(registry: Arc<BackendRegistry>, interval: Duration) -> Self {
        // Per-probe timeouts are set on each request; the client itself
        // carries no global deadline. Redirects are not followed: health
        // is judged on the first response, so a 3xx on the health path is
        // a failure even if the redirect target would answer 200.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build health probe client");
        Self {
            registry,
            interval,
            client,
        }
    }

    /// Run cycles until the shutdown signal fires. The first cycle starts
    /// immediately, so backends become eligible without waiting a full
    /// interval.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            backends = self.registry.all_backends().len(),
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Execute one full cycle: probe every backend concurrently, join, then
    /// swap in the recomputed valid set. Selection observes either the
    /// previous complete result set or this one, never a mix.
    pub async fn run_cycle(&self) {
        tracing::debug!("Starting health check cycle");

        let probes = self
            .registry
            .all_backends()
            .iter()
            .map(|backend| probe::execute(backend, &self.client));
        join_all(probes).await;

        self.registry.rebuild_valid();

        tracing::info!(
            active = self.registry.valid_backends().len(),
            total = self.registry.all_backends().len(),
            "Health check cycle completed"
        );
    }
}
