use std::{fs, io, path::Path, str::FromStr};

use alloy_primitives::Address;

/// A watched account. Labels every metric emitted for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Wallet {
    pub name: String,
    pub address: Address,
}

impl Wallet {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// Metric label pairs for this wallet. The address is rendered EIP-55 checksummed.
    pub fn labels(&self) -> [(&'static str, String); 2] {
        [
            ("name", self.name.clone()),
            ("address", self.address.to_string()),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WalletsFileError {
    #[error("Failed to read wallets file: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid format on line {line}: expected 'name:address', got '{content}'")]
    InvalidFormat { line: usize, content: String },
    #[error("Empty wallet name on line {line}")]
    EmptyName { line: usize },
    #[error("Invalid Ethereum address '{address}' on line {line}")]
    InvalidAddress { line: usize, address: String },
    #[error("No wallets found in file")]
    NoWallets,
}

/// Read the wallets file at `path`. See [`parse_wallets`] for the format.
pub fn load_wallets(path: impl AsRef<Path>) -> Result<Vec<Wallet>, WalletsFileError> {
    parse_wallets(&fs::read_to_string(path)?)
}

/// Parse wallets listed one per line as `name:address`.
///
/// Blank lines and lines starting with `#` are skipped. Both parts are trimmed; only the first
/// colon separates them. The resulting list must not be empty.
pub fn parse_wallets(content: &str) -> Result<Vec<Wallet>, WalletsFileError> {
    let mut wallets = vec![];

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((name, address)) = line.split_once(':') else {
            return Err(WalletsFileError::InvalidFormat {
                line: line_number,
                content: line.to_string(),
            });
        };
        let (name, address) = (name.trim(), address.trim());

        if name.is_empty() {
            return Err(WalletsFileError::EmptyName { line: line_number });
        }

        let invalid_address = || WalletsFileError::InvalidAddress {
            line: line_number,
            address: address.to_string(),
        };
        if !is_valid_address(address) {
            return Err(invalid_address());
        }
        let address = Address::from_str(address).map_err(|_| invalid_address())?;

        wallets.push(Wallet::new(name, address));
    }

    if wallets.is_empty() {
        return Err(WalletsFileError::NoWallets);
    }
    Ok(wallets)
}

/// `0x` followed by exactly 40 hex digits, in any case. Checksums are not verified.
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
