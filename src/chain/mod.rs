//! Chain reader abstraction for read-only contract calls on the live and forked networks.

use crate::domain::Network;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod abi;
pub mod mock;
pub mod rpc;

pub use mock::{MockChainConnector, MockChainReader};
pub use rpc::{JsonRpcChainReader, JsonRpcConnector};

/// Performs `eth_call`-style reads against one of the two networks.
///
/// Every call is attempted exactly once; failures are reported per call.
#[async_trait]
pub trait ChainReader: Send + Sync + fmt::Debug {
    /// Execute a view call and return the raw ABI-encoded return data.
    async fn call(
        &self,
        network: Network,
        to: Address,
        calldata: Bytes,
    ) -> Result<Bytes, ChainCallError>;
}

/// Builds a chain reader bound to one forked network.
pub trait ChainConnector: Send + Sync + fmt::Debug {
    fn connect(&self, fork_network_id: &str) -> Arc<dyn ChainReader>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainCallError {
    /// Connection failure, timeout, DNS.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP error {0}")]
    HttpStatus(u16),
    /// JSON-RPC error object, including reverts.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed RPC response: {0}")]
    MalformedResponse(String),
    #[error("failed to decode {function} output: {message}")]
    Decode { function: String, message: String },
    #[error("{what} is out of range: {value}")]
    OutOfRange { what: &'static str, value: String },
}

/// ABI-encode `call`, execute it on `network` and decode its return value.
pub async fn read<C>(
    reader: &dyn ChainReader,
    network: Network,
    to: Address,
    call: &C,
) -> Result<C::Return, ChainCallError>
where
    C: SolCall + Sync,
{
    let output = reader
        .call(network, to, Bytes::from(call.abi_encode()))
        .await?;

    C::abi_decode_returns(&output).map_err(|e| ChainCallError::Decode {
        function: C::SIGNATURE.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::abi::IMarket;
    use alloy_primitives::{address, U256};

    const MARKET: Address = address!("63Df5e23Db45a2066508318f172bA45B9CD37035");

    #[tokio::test]
    async fn test_read_decodes_typed_return() {
        let reader = MockChainReader::new().with_call(
            Network::Forked,
            MARKET,
            IMarket::collateralFactorBpsCall {},
            U256::from(8000u64),
        );

        let cf = read(&reader, Network::Forked, MARKET, &IMarket::collateralFactorBpsCall {})
            .await
            .unwrap();
        assert_eq!(cf, U256::from(8000u64));
    }

    #[tokio::test]
    async fn test_read_reports_decode_failure() {
        let reader = MockChainReader::new().with_raw(
            Network::Live,
            MARKET,
            IMarket::oracleCall {},
            Bytes::from(vec![0u8; 3]),
        );

        let err = read(&reader, Network::Live, MARKET, &IMarket::oracleCall {})
            .await
            .unwrap_err();
        match err {
            ChainCallError::Decode { function, .. } => assert_eq!(function, "oracle()"),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_chain_call_error_display() {
        let err = ChainCallError::Rpc {
            code: 3,
            message: "execution reverted".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error 3: execution reverted");
        assert_eq!(ChainCallError::HttpStatus(502).to_string(), "HTTP error 502");
    }
}
