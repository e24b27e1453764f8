//! Polling loop.
//!
//! Every cycle takes a registry snapshot, fetches all devices concurrently,
//! waits for every outcome, and folds the results into the metrics store.
//! One dead or babbling plug never delays or fails its siblings; the worst
//! it can do is get itself deregistered.

use crate::client::{DeviceClient, FetchError};
use crate::metrics::MetricsStore;
use crate::registry::DeviceRegistry;
use futures::future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Re-check cadence while no device is known, so a fresh announcement is
/// polled promptly instead of waiting out a full cycle.
const IDLE_RECHECK: Duration = Duration::from_secs(1);

pub struct Poller {
    registry: Arc<DeviceRegistry>,
    client: DeviceClient,
    metrics: Arc<MetricsStore>,
    poll_interval: Duration,
}

impl Poller {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        client: DeviceClient,
        metrics: Arc<MetricsStore>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            registry,
            client,
            metrics,
            poll_interval,
        }
    }

    /// Runs cycles until the shutdown signal flips. The interval counts
    /// from the end of one fan-in to the start of the next cycle.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if self.registry.is_empty() {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(IDLE_RECHECK) => continue,
                }
            }

            self.poll_cycle().await;

            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
        info!("poller stopped");
    }

    /// One fan-out/fan-in round over the current registry snapshot.
    async fn poll_cycle(&self) {
        let devices = self.registry.snapshot();
        debug!("polling {} devices", devices.len());

        let outcomes = future::join_all(devices.iter().map(|d| self.client.fetch(d))).await;

        for (device, outcome) in devices.iter().zip(outcomes) {
            match outcome {
                Ok(reading) => self.metrics.update(&reading),
                Err(FetchError::Unreachable(e)) => {
                    info!("device {device} unreachable, dropping until it re-announces: {e}");
                    self.registry.remove(device);
                }
                Err(FetchError::Malformed(e)) => {
                    warn!("device {device} sent an unusable report: {e}");
                }
            }
        }
    }
}
