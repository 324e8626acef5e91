use std::{io, path::PathBuf, str::FromStr, time::Duration};

use anyhow::anyhow;
use clap::Parser;
use cli::{parsing::parse_duration, CLIConfig};
use defaults::*;
pub use enums::LoggingFormat;
use eth_balance_watcher::{
    CHECK_INTERVAL_ENV, CONFIG_FILE_ENV, ETH_RPC_URL_ENV, LOGGING_FORMAT_ENV, METRICS_HOST_ENV,
    METRICS_PORT_ENV, RPC_TIMEOUT_ENV, SHUTDOWN_GRACE_PERIOD_ENV, WALLETS_FILE_ENV,
};
use file::FileConfig;

mod cli;
mod defaults;
mod display;
mod enums;
mod file;
#[cfg(test)]
mod tests;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("Failed to read config file {path:?}: {source}")]
    FileRead { path: PathBuf, source: io::Error },
    #[error("Failed to parse config file {path:?}: {source}")]
    FileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("ethereum_rpc is required")]
    EmptyRpcUrl,
    #[error("check_interval must be at least {min:?}, got {actual:?}")]
    CheckIntervalTooShort { min: Duration, actual: Duration },
    #[error("rpc_timeout must be positive")]
    ZeroRpcTimeout,
    #[error("Invalid metrics_port: 0")]
    InvalidMetricsPort,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct NetworkConfig {
    pub metrics_host: String,
    pub metrics_port: u16,
}

impl NetworkConfig {
    pub fn metrics_address(&self) -> String {
        format!("{}:{}", self.metrics_host, self.metrics_port)
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ChainConfig {
    pub node_rpc_url: String,
    pub rpc_timeout: Duration,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MonitoringConfig {
    pub check_interval: Duration,
    pub wallets_file: PathBuf,
    pub shutdown_grace_period: Duration,
}

/// Resolved configuration for the balance watcher. Order of precedence is:
/// 1. Command line arguments (`CLIConfig`).
/// 2. Environment variables.
/// 3. The YAML configuration file (`FileConfig`).
/// 4. Default values (available only for some fields).
///
/// For field documentation, see their counterparts in `CLIConfig`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ServerConfig {
    pub logging_format: LoggingFormat,
    pub network: NetworkConfig,
    pub chain: ChainConfig,
    pub monitoring: MonitoringConfig,
}

/// Resolves the configuration using the command line arguments, environment variables, the
/// configuration file and default values.
pub fn resolve_config() -> Result<ServerConfig, ConfigError> {
    resolve_config_from_cli_config(CLIConfig::parse(), |key| std::env::var(key).ok())
}

fn resolve_config_from_cli_config(
    CLIConfig {
        config_file,
        logging_format,
        ethereum_rpc,
        rpc_timeout,
        check_interval,
        metrics_host,
        metrics_port,
        wallets_file,
        shutdown_grace_period,
    }: CLIConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let file = load_config_file(config_file, &env)?;
    let file_duration = |value: Option<file::FileDuration>, key| {
        value.map(|duration| duration.resolve(key)).transpose()
    };

    let network = NetworkConfig {
        metrics_host: resolve_value(
            metrics_host,
            METRICS_HOST_ENV,
            &env,
            file.metrics_host,
            Some(DEFAULT_METRICS_HOST.to_string()),
            parse_string,
        )?,
        metrics_port: resolve_value(
            metrics_port,
            METRICS_PORT_ENV,
            &env,
            file.metrics_port,
            Some(DEFAULT_METRICS_PORT),
            parse_from_str,
        )?,
    };

    let chain = ChainConfig {
        node_rpc_url: resolve_value(
            ethereum_rpc,
            ETH_RPC_URL_ENV,
            &env,
            file.ethereum_rpc,
            None,
            parse_string,
        )?,
        rpc_timeout: resolve_value(
            rpc_timeout,
            RPC_TIMEOUT_ENV,
            &env,
            file_duration(file.rpc_timeout, "rpc_timeout")?,
            Some(DEFAULT_RPC_TIMEOUT),
            parse_duration,
        )?,
    };

    let monitoring = MonitoringConfig {
        check_interval: resolve_value(
            check_interval,
            CHECK_INTERVAL_ENV,
            &env,
            file_duration(file.check_interval, "check_interval")?,
            Some(DEFAULT_CHECK_INTERVAL),
            parse_duration,
        )?,
        wallets_file: resolve_value(
            wallets_file,
            WALLETS_FILE_ENV,
            &env,
            file.wallets_file,
            Some(PathBuf::from(DEFAULT_WALLETS_FILE)),
            |value| Ok(PathBuf::from(value)),
        )?,
        shutdown_grace_period: resolve_value(
            shutdown_grace_period,
            SHUTDOWN_GRACE_PERIOD_ENV,
            &env,
            file_duration(file.shutdown_grace_period, "shutdown_grace_period")?,
            Some(DEFAULT_SHUTDOWN_GRACE_PERIOD),
            parse_duration,
        )?,
    };

    let config = ServerConfig {
        logging_format: resolve_value(
            logging_format,
            LOGGING_FORMAT_ENV,
            &env,
            file.logging_format,
            Some(DEFAULT_LOGGING_FORMAT),
            |value| {
                LoggingFormat::from_str(value).map_err(|_| anyhow!("expected 'text' or 'json'"))
            },
        )?,
        network,
        chain,
        monitoring,
    };
    config.validate()?;
    Ok(config)
}

/// An explicitly requested file must exist, the default one is optional.
fn load_config_file(
    cli_path: Option<PathBuf>,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<FileConfig, ConfigError> {
    match cli_path.or_else(|| env(CONFIG_FILE_ENV).map(PathBuf::from)) {
        Some(path) => FileConfig::load(&path),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            match path.exists() {
                true => FileConfig::load(&path),
                false => Ok(FileConfig::default()),
            }
        }
    }
}

fn resolve_value<T>(
    value: Option<T>,
    env_var: &'static str,
    env: &impl Fn(&str) -> Option<String>,
    file_value: Option<T>,
    default: Option<T>,
    parse: impl Fn(&str) -> anyhow::Result<T>,
) -> Result<T, ConfigError> {
    if let Some(value) = value {
        return Ok(value);
    }
    if let Some(raw) = env(env_var) {
        return parse(&raw).map_err(|err| ConfigError::InvalidValue {
            name: env_var,
            value: raw,
            reason: err.to_string(),
        });
    }
    file_value
        .or(default)
        .ok_or(ConfigError::Missing(env_var))
}

fn parse_string(value: &str) -> anyhow::Result<String> {
    Ok(value.to_string())
}

fn parse_from_str<T: FromStr>(value: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err| anyhow!("{err}"))
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.node_rpc_url.trim().is_empty() {
            return Err(ConfigError::EmptyRpcUrl);
        }
        if self.chain.rpc_timeout.is_zero() {
            return Err(ConfigError::ZeroRpcTimeout);
        }
        if self.monitoring.check_interval < MIN_CHECK_INTERVAL {
            return Err(ConfigError::CheckIntervalTooShort {
                min: MIN_CHECK_INTERVAL,
                actual: self.monitoring.check_interval,
            });
        }
        if self.network.metrics_port == 0 {
            return Err(ConfigError::InvalidMetricsPort);
        }
        Ok(())
    }
}
