use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// Bind address of the HTTP surface (`/` listing and `/metrics`).
    pub http_addr: String,
    /// UDP port the plugs announce themselves on.
    pub announce_port: u16,
    /// TCP port of the plugs' report endpoint.
    pub device_port: u16,
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".into(),
            announce_port: 7979,
            device_port: 80,
            poll_interval_secs: 15,
            fetch_timeout_secs: 1,
        }
    }
}

impl Config {
    pub fn from_yaml(txt: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(txt)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}

pub async fn load_config() -> Config {
    let path = std::env::var("POWERWATCH_CONFIG").unwrap_or_else(|_| "powerwatch.yaml".into());
    if Path::new(&path).exists() {
        let txt = fs::read_to_string(&path).await.unwrap_or_default();
        if txt.trim().is_empty() {
            return Config::default();
        }
        Config::from_yaml(&txt).unwrap_or_else(|e| {
            warn!("invalid config {path}: {e}, using defaults");
            Config::default()
        })
    } else {
        warn!("no {path}, using default config");
        Config::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_announced_protocol() {
        let cfg = Config::default();
        assert_eq!(cfg.announce_port, 7979);
        assert_eq!(cfg.device_port, 80);
        assert_eq!(cfg.poll_interval_secs, 15);
        assert_eq!(cfg.fetch_timeout_secs, 1);
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let cfg = Config::from_yaml("poll_interval_secs: 30\nhttp_addr: \"127.0.0.1:9102\"\n")
            .unwrap();
        assert_eq!(cfg.poll_interval_secs, 30);
        assert_eq!(cfg.http_addr, "127.0.0.1:9102");
        assert_eq!(cfg.announce_port, 7979);
        assert_eq!(cfg.fetch_timeout_secs, 1);
    }

    #[test]
    fn garbage_yaml_is_an_error() {
        assert!(Config::from_yaml("announce_port: [not, a, port]").is_err());
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var(
            "POWERWATCH_CONFIG",
            dir.path().join("does-not-exist.yaml"),
        );
        let cfg = load_config().await;
        std::env::remove_var("POWERWATCH_CONFIG");
        assert_eq!(cfg.announce_port, Config::default().announce_port);
    }
}
