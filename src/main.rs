//! powerwatch - Prometheus exporter for self-announcing LAN power plugs
//!
//! Bootstrap order matters here:
//! - bind the announcement socket first; a taken port is startup-fatal
//! - spawn listener + poller under the supervisor
//! - serve `/` and `/metrics` until ctrl-c, then stop the supervisor

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use powerwatch::client::DeviceClient;
use powerwatch::config;
use powerwatch::discovery::AnnouncementListener;
use powerwatch::http::{self, AppState};
use powerwatch::metrics::MetricsStore;
use powerwatch::poller::Poller;
use powerwatch::registry::DeviceRegistry;
use powerwatch::supervisor::Supervisor;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("powerwatch=info")),
        )
        .init();

    let cfg = config::load_config().await;

    let registry = Arc::new(DeviceRegistry::new());
    let metrics = Arc::new(MetricsStore::new().context("failed to set up metrics store")?);

    let listener = AnnouncementListener::bind(cfg.announce_port, registry.clone()).await?;
    let client = DeviceClient::new(registry.clone(), cfg.device_port, cfg.fetch_timeout())?;
    let poller = Poller::new(
        registry.clone(),
        client,
        metrics.clone(),
        cfg.poll_interval(),
    );
    let supervisor = Supervisor::start(listener, poller);

    let app = http::build_router(AppState { registry, metrics });
    let addr: SocketAddr = cfg
        .http_addr
        .parse()
        .with_context(|| format!("invalid http_addr {}", cfg.http_addr))?;
    let tcp = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind http listener on {addr}"))?;
    info!("serving metrics on http://{addr}");

    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("shutting down");
    supervisor.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
