//! HTTP client for the plugs' report endpoint.

use crate::models::{DeviceReport, Reading};
use crate::registry::DeviceRegistry;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Per-device fetch outcome. `Unreachable` means the device is gone until it
/// announces itself again; `Malformed` means it answered but the payload was
/// not a report, which keeps the device registered.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("malformed report: {0}")]
    Malformed(String),
}

pub struct DeviceClient {
    http: reqwest::Client,
    registry: Arc<DeviceRegistry>,
    report_port: u16,
}

impl DeviceClient {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        report_port: u16,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build device http client")?;
        Ok(Self {
            http,
            registry,
            report_port,
        })
    }

    /// Fetches one report from one device and stamps the registry with the
    /// fetch time, so the returned reading carries the wall-clock interval
    /// since the device's previous successful fetch.
    pub async fn fetch(&self, addr: &str) -> std::result::Result<Reading, FetchError> {
        let url = format!("http://{addr}:{}/report", self.report_port);

        let res = self.http.get(&url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                FetchError::Unreachable(e.to_string())
            } else {
                FetchError::Malformed(e.to_string())
            }
        })?;
        let res = res
            .error_for_status()
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        let report: DeviceReport = res
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let interval = self.registry.touch(addr);
        Ok(Reading {
            device: addr.to_string(),
            power: report.power,
            avg_power: report.ws,
            interval,
        })
    }
}
