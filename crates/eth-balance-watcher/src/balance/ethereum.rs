use std::{future::IntoFuture, time::Duration};

use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_transport::TransportError;
use tracing::info;

use crate::balance::{BalanceSource, RpcError};

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);
const CHAIN_ID_TIMEOUT: Duration = Duration::from_secs(5);

/// Startup failures when reaching the node.
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    #[error("Failed to connect to Ethereum node: {0:?}")]
    Connection(TransportError),
    #[error("Failed to get chain ID: {0:?}")]
    ChainId(TransportError),
    #[error("Timed out after {0:?} while getting chain ID")]
    Timeout(Duration),
}

/// Balance source backed by an Ethereum JSON-RPC node. Every query is bounded by `timeout`.
pub struct EthereumClient<P> {
    provider: P,
    timeout: Duration,
}

impl<P: Provider> EthereumClient<P> {
    pub fn new(provider: P, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn chain_id(&self) -> Result<u64, ConnectivityError> {
        match tokio::time::timeout(CHAIN_ID_TIMEOUT, self.provider.get_chain_id().into_future())
            .await
        {
            Ok(result) => result.map_err(ConnectivityError::ChainId),
            Err(_) => Err(ConnectivityError::Timeout(CHAIN_ID_TIMEOUT)),
        }
    }
}

/// Connect to the node at `rpc_url` (HTTP, WS or IPC) and make sure it answers.
pub async fn connect(
    rpc_url: String,
    timeout: Duration,
) -> Result<EthereumClient<impl Provider>, ConnectivityError> {
    let provider = ProviderBuilder::new()
        .on_builtin(&rpc_url)
        .await
        .map_err(ConnectivityError::Connection)?;

    let client = EthereumClient::new(provider, timeout);
    let chain_id = client.chain_id().await?;
    info!(chain_id, "Connected to Ethereum node");

    Ok(client)
}

impl<P: Provider + 'static> BalanceSource for EthereumClient<P> {
    async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        let query = self.provider.get_balance(address).into_future();
        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(balance)) => Ok(balance),
            Ok(Err(source)) => Err(RpcError::Transport { address, source }),
            Err(_) => Err(RpcError::Timeout {
                address,
                timeout: self.timeout,
            }),
        }
    }
}
