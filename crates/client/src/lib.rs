//! Read-only JSON-RPC providers for the L1 and L2 endpoints.
//!
//! The forger never signs or submits transactions, so providers are built
//! without a wallet layer.

use alloy_primitives::Address;
use alloy_provider::{Provider, ProviderBuilder};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the RPC endpoint
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Convenience function to create an ethereum rpc provider from url.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider and make sure the endpoint serves `expected_chain_id`
/// and that `contract` has code there.
///
/// Used at startup so a wrong endpoint or a wrong network preset fails before
/// any scanning starts.
pub async fn connect_checked(
    rpc_url: &str,
    expected_chain_id: u64,
    contract: Address,
) -> Result<impl Provider + Clone, ClientError> {
    let provider = create_provider(rpc_url)?;

    let chain_id = provider
        .get_chain_id()
        .await
        .map_err(|e| ClientError::Connection(format!("{rpc_url}: {e}")))?;
    check_chain_id(rpc_url, expected_chain_id, chain_id)?;

    let code = provider
        .get_code_at(contract)
        .await
        .map_err(|e| ClientError::Connection(format!("{rpc_url}: {e}")))?;
    if code.is_empty() {
        return Err(ClientError::Connection(format!(
            "no contract code at {contract} on chain {chain_id}"
        )));
    }

    debug!(rpc_url, chain_id, %contract, "Connected to RPC endpoint");
    Ok(provider)
}

fn check_chain_id(rpc_url: &str, expected: u64, actual: u64) -> Result<(), ClientError> {
    if actual != expected {
        return Err(ClientError::Connection(format!(
            "{rpc_url} serves chain {actual}, expected chain {expected}"
        )));
    }
    Ok(())
}
