use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::IntoResponse,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::{
    balance::{wei_to_f64, BalanceReading},
    Wallet,
};

pub const BALANCE_WEI: &str = "eth_wallet_balance_wei";
pub const BALANCE_ETHER: &str = "eth_wallet_balance_ether";
pub const LAST_CHECK_TIMESTAMP: &str = "eth_wallet_last_check_timestamp";
pub const CHECK_ERRORS: &str = "eth_wallet_check_errors_total";
pub const CHECK_DURATION: &str = "eth_wallet_check_duration_seconds";
pub const TOTAL_REQUESTS_METRIC: &str = "http_requests_total";
pub const REQUEST_DURATION_METRIC: &str = "http_requests_duration_seconds";

/// Prometheus' default histogram buckets.
const DEFAULT_SECONDS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

const EXPONENTIAL_SECONDS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0,
];

/// Where balance check results end up. Implementations must accept concurrent writes.
pub trait MetricsSink: Send + Sync + 'static {
    fn record_success(&self, wallet: &Wallet, reading: &BalanceReading);
    fn record_error(&self, wallet: &Wallet);
}

/// Sink writing through the `metrics` facade, i.e. into whatever recorder is installed.
#[derive(Copy, Clone, Debug, Default)]
pub struct PrometheusSink;

impl PrometheusSink {
    /// Registers metric descriptions with the current recorder, so call it after the recorder
    /// is installed.
    pub fn new() -> Self {
        metrics::describe_gauge!(BALANCE_WEI, "Current wallet balance in Wei");
        metrics::describe_gauge!(BALANCE_ETHER, "Current wallet balance in Ether");
        metrics::describe_gauge!(
            LAST_CHECK_TIMESTAMP,
            "Unix timestamp of the last successful balance check"
        );
        metrics::describe_counter!(CHECK_ERRORS, "Total number of balance check errors");
        metrics::describe_histogram!(CHECK_DURATION, "Duration of balance check in seconds");
        Self
    }
}

impl MetricsSink for PrometheusSink {
    fn record_success(&self, wallet: &Wallet, reading: &BalanceReading) {
        let labels = wallet.labels();

        metrics::gauge!(BALANCE_WEI, &labels).set(wei_to_f64(reading.wei));
        metrics::gauge!(BALANCE_ETHER, &labels).set(reading.ether_f64());
        metrics::gauge!(LAST_CHECK_TIMESTAMP, &labels)
            .set(reading.checked_at.unix_timestamp_nanos() as f64 / 1e9);
        metrics::histogram!(CHECK_DURATION, &labels).record(reading.duration.as_secs_f64());
    }

    fn record_error(&self, wallet: &Wallet) {
        metrics::counter!(CHECK_ERRORS, &wallet.labels()).increment(1);
    }
}

/// Builder with the histogram buckets used by this service.
pub fn metrics_builder() -> Result<PrometheusBuilder> {
    Ok(PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(CHECK_DURATION.to_string()), DEFAULT_SECONDS)?
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION_METRIC.to_string()),
            EXPONENTIAL_SECONDS,
        )?)
}

/// Setup Prometheus metrics handle with custom histogram buckets etc.
///
/// Can be called only once, during server setup.
pub fn setup_metrics_handle() -> Result<PrometheusHandle> {
    Ok(metrics_builder()?.install_recorder()?)
}

/// Middleware to record HTTP request metrics.
pub async fn request_metrics(req: Request, next: Next) -> impl IntoResponse {
    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched_path) => matched_path.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };
    let method = req.method().clone();

    let start = Instant::now();
    let response = next.run(req).await;
    let latency = start.elapsed().as_secs_f64();

    let labels = [
        ("method", method.to_string()),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];

    metrics::counter!(TOTAL_REQUESTS_METRIC, &labels).increment(1);
    metrics::histogram!(REQUEST_DURATION_METRIC, &labels).record(latency);

    response
}
