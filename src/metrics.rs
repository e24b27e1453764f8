//! Exported metrics.
//!
//! Two series per device: an instantaneous power gauge (last observation
//! wins) and a cumulative energy counter. The counter is fed with the
//! per-interval delta computed from each reading, never with the device's
//! own lifetime figure, so a plug silently resetting its internal counter
//! cannot produce a discontinuity in the exported series.

use crate::models::Reading;
use anyhow::{Context, Result};
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;

pub struct MetricsStore {
    registry: Registry,
    power: GaugeVec,
    energy: CounterVec,
}

impl MetricsStore {
    pub fn new() -> Result<Self> {
        let power = GaugeVec::new(
            Opts::new("powerwatch_power_watts", "Instantaneous power draw"),
            &["device"],
        )
        .context("failed to create power gauge")?;
        let energy = CounterVec::new(
            Opts::new(
                "powerwatch_energy_watt_hours_total",
                "Accumulated energy since exporter start",
            ),
            &["device"],
        )
        .context("failed to create energy counter")?;

        let registry = Registry::new();
        registry
            .register(Box::new(power.clone()))
            .context("failed to register power gauge")?;
        registry
            .register(Box::new(energy.clone()))
            .context("failed to register energy counter")?;

        Ok(Self {
            registry,
            power,
            energy,
        })
    }

    /// Folds one reading into the exported series. Pure accounting, no
    /// error conditions: a non-finite or negative delta (clock skew) is
    /// dropped rather than fed to the monotonic counter.
    pub fn update(&self, reading: &Reading) {
        self.power
            .with_label_values(&[reading.device.as_str()])
            .set(reading.power);

        let delta = reading.energy_wh();
        if delta.is_finite() && delta >= 0.0 {
            self.energy
                .with_label_values(&[reading.device.as_str()])
                .inc_by(delta);
        } else {
            debug!("dropping bogus energy delta {delta} for {}", reading.device);
        }
    }

    /// Text exposition of everything gathered so far.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .context("failed to encode metrics")?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn reading(device: &str, power: f64, avg_power: f64, secs: u64) -> Reading {
        Reading {
            device: device.into(),
            power,
            avg_power,
            interval: Duration::from_secs(secs),
        }
    }

    #[test]
    fn one_hour_at_hundred_watts_accumulates_one_hundred_watt_hours() {
        let store = MetricsStore::new().unwrap();
        store.update(&reading("192.168.1.40", 96.0, 100.0, 3600));
        let total = store.energy.with_label_values(&["192.168.1.40"]).get();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn power_gauge_is_last_write_wins() {
        let store = MetricsStore::new().unwrap();
        store.update(&reading("192.168.1.40", 50.0, 50.0, 15));
        store.update(&reading("192.168.1.40", 8.5, 8.5, 15));
        assert_eq!(store.power.with_label_values(&["192.168.1.40"]).get(), 8.5);
    }

    #[test]
    fn energy_accumulates_across_cycles() {
        let store = MetricsStore::new().unwrap();
        store.update(&reading("192.168.1.40", 100.0, 100.0, 1800));
        store.update(&reading("192.168.1.40", 100.0, 100.0, 1800));
        let total = store.energy.with_label_values(&["192.168.1.40"]).get();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn devices_get_independent_series() {
        let store = MetricsStore::new().unwrap();
        store.update(&reading("192.168.1.40", 10.0, 10.0, 3600));
        store.update(&reading("192.168.1.41", 20.0, 20.0, 3600));
        assert_eq!(store.power.with_label_values(&["192.168.1.40"]).get(), 10.0);
        assert_eq!(store.power.with_label_values(&["192.168.1.41"]).get(), 20.0);
    }

    #[test]
    fn bogus_deltas_never_reach_the_counter() {
        let store = MetricsStore::new().unwrap();
        store.update(&reading("192.168.1.40", 10.0, -5.0, 3600));
        store.update(&reading("192.168.1.40", 10.0, f64::NAN, 3600));
        assert_eq!(store.energy.with_label_values(&["192.168.1.40"]).get(), 0.0);
    }

    #[test]
    fn render_exposes_both_series() {
        let store = MetricsStore::new().unwrap();
        store.update(&reading("192.168.1.40", 42.0, 40.0, 15));
        let text = store.render().unwrap();
        assert!(text.contains("powerwatch_power_watts{device=\"192.168.1.40\"} 42"));
        assert!(text.contains("powerwatch_energy_watt_hours_total{device=\"192.168.1.40\"}"));
    }
}
