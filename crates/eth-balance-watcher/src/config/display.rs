use url::{ParseError, Url};

use crate::config::ServerConfig;

const REDACTED: &str = "[REDACTED]";

impl ServerConfig {
    pub fn print_safe_config(&self) -> String {
        format!(
            r"
ServerConfig {{
    logging_format: {:#?},
    network: {:#?},
    monitoring: {:#?},
    chain:
        ChainConfig {{
            node_rpc_url: {:#?},
            rpc_timeout: {:#?},
        }},
}}",
            self.logging_format,
            self.network,
            self.monitoring,
            redact_url(&self.chain.node_rpc_url),
            self.chain.rpc_timeout,
        )
    }
}

/// Keep only the scheme and the authority of `url`, without credentials. Providers put API keys
/// in the path or query.
pub fn redact_url(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        // IPC endpoints are plain filesystem paths.
        Err(ParseError::RelativeUrlWithoutBase) => return url.to_string(),
        Err(_) => return REDACTED.to_string(),
    };
    if parsed.cannot_be_a_base() {
        return format!("{}:{REDACTED}", parsed.scheme());
    }

    let has_secrets = !parsed.username().is_empty()
        || parsed.password().is_some()
        || !parsed.path().trim_start_matches('/').is_empty()
        || parsed.query().is_some()
        || parsed.fragment().is_some();

    // Only fails for URLs without a host, which cannot carry credentials anyway.
    let _ = parsed.set_username("");
    let _ = parsed.set_password(None);
    parsed.set_path("");
    parsed.set_query(None);
    parsed.set_fragment(None);

    let base = parsed.as_str().trim_end_matches('/');
    match has_secrets {
        true => format!("{base}/{REDACTED}"),
        false => base.to_string(),
    }
}
