use std::time::Duration;

use crate::config::LoggingFormat;

pub const DEFAULT_LOGGING_FORMAT: LoggingFormat = LoggingFormat::Json;
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_RPC_TIMEOUT: Duration = eth_balance_watcher::balance::DEFAULT_RPC_TIMEOUT;
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_METRICS_HOST: &str = "0.0.0.0";
pub const DEFAULT_METRICS_PORT: u16 = 9090;
pub const DEFAULT_WALLETS_FILE: &str = "wallets.txt";
pub const DEFAULT_SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Shorter intervals would hammer the RPC node.
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(10);
