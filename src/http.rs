//! HTTP surface: device listing on `/`, Prometheus exposition on `/metrics`.

use crate::metrics::MetricsStore;
use crate::models::DeviceView;
use crate::registry::DeviceRegistry;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DeviceRegistry>,
    pub metrics: Arc<MetricsStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_devices))
        .route("/metrics", get(export_metrics))
        .with_state(state)
}

async fn list_devices(State(app): State<AppState>) -> Json<Vec<DeviceView>> {
    let mut list: Vec<DeviceView> = app
        .registry
        .snapshot()
        .into_iter()
        .map(|device| {
            let last_seen = app
                .registry
                .last_seen(&device)
                .and_then(|t| t.format(&Rfc3339).ok());
            DeviceView { device, last_seen }
        })
        .collect();
    list.sort_by(|a, b| a.device.cmp(&b.device));
    Json(list)
}

async fn export_metrics(
    State(app): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 1], String), StatusCode> {
    match app.metrics.render() {
        Ok(body) => Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)),
        Err(e) => {
            error!("metrics encoding failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
