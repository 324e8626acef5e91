use std::{path::PathBuf, time::Duration};

use clap::Parser;
use eth_balance_watcher::*;

use crate::config::{defaults::*, enums::LoggingFormat};

/// Configuration for the balance watcher through the command line arguments.
///
/// All fields are optional, as they can be provided either through environment variables, the
/// configuration file or, in some cases, through default values.
#[derive(Clone, Debug, Default, Parser)]
#[command(version, about)]
pub struct CLIConfig {
    #[clap(
        long,
        help = "Path to the YAML configuration file.",
        long_help = format!("Path to the YAML configuration file. If not provided, the value from \
            the environment variable `{CONFIG_FILE_ENV}` will be used. If that is not set, \
            `{DEFAULT_CONFIG_FILE}` is read when it exists.")
    )]
    pub config_file: Option<PathBuf>,

    #[clap(
        long,
        value_enum,
        help = "Logging format configuration.",
        long_help = format!("Logging format configuration. If not provided, the value from the \
            environment variable `{LOGGING_FORMAT_ENV}` will be used. If that is not set, the \
            default value is `{DEFAULT_LOGGING_FORMAT:?}`.")
    )]
    pub logging_format: Option<LoggingFormat>,

    #[clap(
        long,
        help = "URL of the Ethereum RPC node.",
        long_help = format!("URL of the Ethereum RPC node (http, ws or ipc). If not provided, the \
            value from the environment variable `{ETH_RPC_URL_ENV}` will be used.")
    )]
    pub ethereum_rpc: Option<String>,

    #[clap(
        long,
        help = "Timeout of a single balance query.",
        long_help = format!("Timeout of a single balance query, e.g. `10s` or `500ms`. If not \
            provided, the value from the environment variable `{RPC_TIMEOUT_ENV}` will be used. If \
            that is not set, the default value is `{}s`.", DEFAULT_RPC_TIMEOUT.as_secs()),
        value_parser = parsing::parse_duration
    )]
    pub rpc_timeout: Option<Duration>,

    #[clap(
        long,
        help = "Interval between balance checks.",
        long_help = format!("Interval between balance checks, e.g. `60`, `5m` or `1m30s`. Must \
            be at least `{}s`. If not provided, the value from the environment variable \
            `{CHECK_INTERVAL_ENV}` will be used. If that is not set, the default value is `{}s`.",
            MIN_CHECK_INTERVAL.as_secs(), DEFAULT_CHECK_INTERVAL.as_secs()),
        value_parser = parsing::parse_duration
    )]
    pub check_interval: Option<Duration>,

    #[clap(
        long,
        help = "Host where the metrics server should be run.",
        long_help = format!("Host where the metrics server should be run. If not provided, the \
            value from the environment variable `{METRICS_HOST_ENV}` will be used. If that is not \
            set, the default value is `{DEFAULT_METRICS_HOST}`.")
    )]
    pub metrics_host: Option<String>,

    #[clap(
        long,
        help = "Port where the metrics should be exposed.",
        long_help = format!("Port where the metrics should be exposed. If not provided, the value \
            from the environment variable `{METRICS_PORT_ENV}` will be used. If that is not set, \
            the default value is `{DEFAULT_METRICS_PORT}`.")
    )]
    pub metrics_port: Option<u16>,

    #[clap(
        long,
        help = "File with the watched wallets.",
        long_help = format!("File with the watched wallets, one `name:address` per line. If not \
            provided, the value from the environment variable `{WALLETS_FILE_ENV}` will be used. \
            If that is not set, the default value is `{DEFAULT_WALLETS_FILE}`.")
    )]
    pub wallets_file: Option<PathBuf>,

    #[clap(
        long,
        help = "How long to wait for an in-flight balance check round on shutdown.",
        long_help = format!("How long to wait for an in-flight balance check round on shutdown. If \
            not provided, the value from the environment variable `{SHUTDOWN_GRACE_PERIOD_ENV}` \
            will be used. If that is not set, the default value is `{}s`.",
            DEFAULT_SHUTDOWN_GRACE_PERIOD.as_secs()),
        value_parser = parsing::parse_duration
    )]
    pub shutdown_grace_period: Option<Duration>,
}

pub(super) mod parsing {
    use std::time::Duration;

    use anyhow::{anyhow, bail};

    const NANOS_PER_SECOND: u128 = 1_000_000_000;
    /// Fractional digits beyond this are below nanosecond precision for every unit.
    const MAX_FRACTION_DIGITS: usize = 18;

    /// Parse plain seconds (`90`) or a sequence of amounts with units, like `1m30s`, `1.5h` or
    /// `250ms`. Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
    pub fn parse_duration(string: &str) -> anyhow::Result<Duration> {
        let string = string.trim();
        if let Ok(seconds) = string.parse::<u64>() {
            return Ok(Duration::from_secs(seconds));
        }
        if string.is_empty() {
            bail!("empty duration");
        }

        let too_long = || anyhow!("duration '{string}' is too long");
        let mut rest = string;
        let mut total_nanos = 0u128;
        while !rest.is_empty() {
            let amount_end = rest
                .find(|c: char| !c.is_ascii_digit() && c != '.')
                .unwrap_or(rest.len());
            let (amount, tail) = rest.split_at(amount_end);
            let unit_end = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_end);

            let unit_nanos = match unit {
                "ns" => 1,
                "us" | "µs" => 1_000,
                "ms" => 1_000_000,
                "s" => NANOS_PER_SECOND,
                "m" => 60 * NANOS_PER_SECOND,
                "h" => 60 * 60 * NANOS_PER_SECOND,
                "" => bail!("missing unit in duration '{string}'"),
                unit => bail!("unknown unit '{unit}' in duration '{string}'"),
            };
            let nanos = amount_nanos(amount, unit_nanos)
                .ok_or_else(|| anyhow!("invalid duration '{string}'"))?;
            total_nanos = total_nanos.checked_add(nanos).ok_or_else(too_long)?;
            rest = tail;
        }

        let seconds = u64::try_from(total_nanos / NANOS_PER_SECOND).map_err(|_| too_long())?;
        let subsec_nanos = (total_nanos % NANOS_PER_SECOND) as u32;
        Ok(Duration::new(seconds, subsec_nanos))
    }

    /// `amount` (like `1`, `1.5` or `.5`) times `unit_nanos`, rounded down to whole nanoseconds.
    fn amount_nanos(amount: &str, unit_nanos: u128) -> Option<u128> {
        let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return None;
        }

        let whole = match whole {
            "" => 0,
            whole => whole.parse::<u128>().ok()?,
        };
        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        let fraction_nanos = match fraction {
            "" => 0,
            fraction => {
                let scale = 10u128.pow(fraction.len() as u32);
                fraction.parse::<u128>().ok()? * unit_nanos / scale
            }
        };

        whole.checked_mul(unit_nanos)?.checked_add(fraction_nanos)
    }
}
