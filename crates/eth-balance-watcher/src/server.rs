use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::{
    balance::BalanceSource,
    metrics::{request_metrics, MetricsSink},
    monitor::BalanceMonitor,
    HealthResponse,
};

pub fn success_response<R: Serialize>(response: R) -> Response {
    (StatusCode::OK, Json(response)).into_response()
}

pub struct AppState<S, M> {
    pub metrics_handle: PrometheusHandle,
    pub monitor: BalanceMonitor<S, M>,
}

impl<S, M> Clone for AppState<S, M> {
    fn clone(&self) -> Self {
        Self {
            metrics_handle: self.metrics_handle.clone(),
            monitor: self.monitor.clone(),
        }
    }
}

/// Routes served on the metrics address.
pub fn router<S: BalanceSource, M: MetricsSink>(state: AppState<S, M>) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_endpoint::<S, M>))
        .route("/health", get(health_endpoint))
        .route("/check", post(check_endpoint::<S, M>))
        .with_state(state)
        .route_layer(middleware::from_fn(request_metrics))
        .layer(CorsLayer::permissive())
}

async fn prometheus_endpoint<S: BalanceSource, M: MetricsSink>(
    state: State<AppState<S, M>>,
) -> impl IntoResponse {
    state.metrics_handle.render()
}

async fn health_endpoint() -> impl IntoResponse {
    debug!("Healthcheck request received");
    success_response(HealthResponse::healthy())
}

/// Run a balance check round on demand and report how it went.
async fn check_endpoint<S: BalanceSource, M: MetricsSink>(
    state: State<AppState<S, M>>,
) -> impl IntoResponse {
    info!("Manual balance check requested");
    success_response(state.monitor.check_once().await)
}
