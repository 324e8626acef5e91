use std::{fs, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::config::{cli::parsing::parse_duration, ConfigError, LoggingFormat};

/// Contents of the YAML configuration file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub logging_format: Option<LoggingFormat>,
    pub ethereum_rpc: Option<String>,
    pub rpc_timeout: Option<FileDuration>,
    pub check_interval: Option<FileDuration>,
    pub metrics_host: Option<String>,
    pub metrics_port: Option<u16>,
    pub wallets_file: Option<PathBuf>,
    pub shutdown_grace_period: Option<FileDuration>,
}

/// Either a number of seconds or a duration string like `30s`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileDuration {
    Seconds(u64),
    Text(String),
}

impl FileDuration {
    pub fn resolve(&self, key: &'static str) -> Result<Duration, ConfigError> {
        match self {
            Self::Seconds(seconds) => Ok(Duration::from_secs(*seconds)),
            Self::Text(text) => parse_duration(text).map_err(|err| ConfigError::InvalidValue {
                name: key,
                value: text.clone(),
                reason: err.to_string(),
            }),
        }
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::FileParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        let has_keys = content.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        });
        match has_keys {
            true => serde_yaml::from_str(content),
            false => Ok(Self::default()),
        }
    }
}
