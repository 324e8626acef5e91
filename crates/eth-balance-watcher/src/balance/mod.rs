use std::{future::Future, time::Duration};

use alloy_primitives::{Address, U256};
use alloy_transport::TransportError;
use time::OffsetDateTime;

mod ethereum;
mod units;

pub use ethereum::{connect, ConnectivityError, EthereumClient, DEFAULT_RPC_TIMEOUT};
pub use units::{wei_to_ether, wei_to_ether_f64, wei_to_f64};

/// Errors of a single balance query.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Failed to get balance for {address}: {source:?}")]
    Transport {
        address: Address,
        source: TransportError,
    },
    #[error("Balance query for {address} timed out after {timeout:?}")]
    Timeout { address: Address, timeout: Duration },
}

/// Anything that can tell the current balance (in wei) of an address.
pub trait BalanceSource: Send + Sync + 'static {
    fn get_balance(&self, address: Address) -> impl Future<Output = Result<U256, RpcError>> + Send;
}

/// Outcome of a successful balance check of a single wallet.
#[derive(Clone, Debug, PartialEq)]
pub struct BalanceReading {
    pub wei: U256,
    /// Exact decimal amount, see [`wei_to_ether`].
    pub ether: String,
    pub checked_at: OffsetDateTime,
    pub duration: Duration,
}

impl BalanceReading {
    pub fn new(wei: U256, checked_at: OffsetDateTime, duration: Duration) -> Self {
        Self {
            wei,
            ether: wei_to_ether(wei),
            checked_at,
            duration,
        }
    }

    pub fn ether_f64(&self) -> f64 {
        units::ether_to_f64(&self.ether)
    }
}
