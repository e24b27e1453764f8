use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload of a plug's `/report` endpoint. Devices send more fields than
/// these two; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct DeviceReport {
    pub power: f64,
    #[serde(rename = "Ws")]
    pub ws: f64,
}

/// One successful fetch from one device.
#[derive(Debug, Clone)]
pub struct Reading {
    pub device: String,
    pub power: f64,
    /// The device's `Ws` field, taken as its average power over the
    /// reporting interval. That reading is not otherwise verifiable.
    pub avg_power: f64,
    /// Wall-clock time since this device's previous successful fetch.
    pub interval: Duration,
}

impl Reading {
    /// Energy accumulated over the interval, in watt-hours.
    pub fn energy_wh(&self) -> f64 {
        self.avg_power * self.interval.as_secs_f64() / 3600.0
    }
}

#[derive(Debug, Serialize)]
pub struct DeviceView {
    pub device: String,
    pub last_seen: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_ignores_extra_fields() {
        let raw = r#"{"power":11.5,"Ws":9.8,"relay":true,"temperature":24.1}"#;
        let report: DeviceReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.power, 11.5);
        assert_eq!(report.ws, 9.8);
    }

    #[test]
    fn report_requires_both_fields() {
        assert!(serde_json::from_str::<DeviceReport>(r#"{"power":11.5}"#).is_err());
        assert!(serde_json::from_str::<DeviceReport>(r#"{"Ws":9.8}"#).is_err());
        assert!(serde_json::from_str::<DeviceReport>(r#"{"power":"on","Ws":9.8}"#).is_err());
    }

    #[test]
    fn one_hour_at_hundred_watts_is_one_hundred_watt_hours() {
        let reading = Reading {
            device: "192.168.1.40".into(),
            power: 96.0,
            avg_power: 100.0,
            interval: Duration::from_secs(3600),
        };
        assert!((reading.energy_wh() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_interval_yields_zero_energy() {
        let reading = Reading {
            device: "192.168.1.40".into(),
            power: 96.0,
            avg_power: 100.0,
            interval: Duration::ZERO,
        };
        assert_eq!(reading.energy_wh(), 0.0);
    }
}
