pub const LOGGING_FORMAT_ENV: &str = "LOGGING_FORMAT";
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";
pub const ETH_RPC_URL_ENV: &str = "ETH_RPC_URL";
pub const RPC_TIMEOUT_ENV: &str = "RPC_TIMEOUT";
pub const CHECK_INTERVAL_ENV: &str = "CHECK_INTERVAL";
pub const METRICS_HOST_ENV: &str = "METRICS_HOST";
pub const METRICS_PORT_ENV: &str = "METRICS_PORT";
pub const WALLETS_FILE_ENV: &str = "WALLETS_FILE";
pub const SHUTDOWN_GRACE_PERIOD_ENV: &str = "SHUTDOWN_GRACE_PERIOD";
