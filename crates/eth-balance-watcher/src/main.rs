use std::{env, io, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use eth_balance_watcher::{
    balance::{self, BalanceSource},
    load_wallets,
    metrics::{setup_metrics_handle, MetricsSink, PrometheusSink},
    monitor::BalanceMonitor,
    server::{router, AppState},
};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{resolve_config, LoggingFormat, ServerConfig};

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let server_config = resolve_config()?;
    init_logging(server_config.logging_format)?;

    info!("Starting ETH balance watcher.");
    info!(
        "Server configuration:\n{}",
        server_config.print_safe_config()
    );

    let wallets = load_wallets(&server_config.monitoring.wallets_file)?;
    info!(wallets_count = wallets.len(), "Loaded wallets");

    let client = balance::connect(
        server_config.chain.node_rpc_url.clone(),
        server_config.chain.rpc_timeout,
    )
    .await?;

    let metrics_handle = setup_metrics_handle()?;
    let monitor = BalanceMonitor::new(
        Arc::new(client),
        Arc::new(PrometheusSink::new()),
        wallets,
        server_config.monitoring.check_interval,
    );

    let cancellation = CancellationToken::new();
    let monitor_task = tokio::spawn(monitor.clone().start(cancellation.clone()));

    let state = AppState {
        metrics_handle,
        monitor,
    };
    let server_result = start_metrics_server(&server_config, state, cancellation.clone()).await;

    // The server may have stopped on its own, so make sure the monitor stops as well.
    cancellation.cancel();
    wait_for_monitor(
        monitor_task,
        server_config.monitoring.shutdown_grace_period,
    )
    .await;

    server_result?;
    info!("Shutdown complete");
    Ok(())
}

async fn start_metrics_server<S: BalanceSource, M: MetricsSink>(
    config: &ServerConfig,
    state: AppState<S, M>,
    cancellation: CancellationToken,
) -> Result<()> {
    let address = config.network.metrics_address();
    let listener = TcpListener::bind(address.clone()).await?;
    info!("Exposing metrics on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(cancellation))
        .await?;
    Ok(())
}

/// Resolves on SIGINT or SIGTERM and cancels `cancellation`.
async fn shutdown_signal(cancellation: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = cancellation.cancelled() => {},
    }

    info!("Shutting down gracefully...");
    cancellation.cancel();
}

async fn wait_for_monitor(monitor_task: JoinHandle<()>, grace_period: Duration) {
    match tokio::time::timeout(grace_period, monitor_task).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!("Balance monitor task failed: {err}"),
        Err(_) => warn!(
            ?grace_period,
            "Balance monitor did not stop within the grace period"
        ),
    }
}

fn init_logging(format: LoggingFormat) -> Result<()> {
    const LOG_CONFIGURATION_ENVVAR: &str = "RUST_LOG";

    let filter = EnvFilter::new(
        env::var(LOG_CONFIGURATION_ENVVAR)
            .as_deref()
            .unwrap_or("info"),
    );

    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stdout)
        .with_target(true)
        .with_env_filter(filter);

    match format {
        LoggingFormat::Json => subscriber.json().try_init(),
        LoggingFormat::Text => subscriber.try_init(),
    }
    .map_err(|err| anyhow!(err))
}
