//! Mock chain reader for testing without network calls.

use super::{ChainCallError, ChainConnector, ChainReader};
use crate::domain::Network;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

type CallKey = (Network, Address, Vec<u8>);

/// Mock chain reader that answers predefined calls.
///
/// Calls without a registered response fail with an RPC error.
#[derive(Debug, Clone, Default)]
pub struct MockChainReader {
    responses: HashMap<CallKey, Result<Bytes, ChainCallError>>,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `call` on `network` at `to` with the ABI encoding of `value`.
    pub fn with_call<C: SolCall, V: SolValue>(
        self,
        network: Network,
        to: Address,
        call: C,
        value: V,
    ) -> Self {
        self.with_raw(network, to, call, Bytes::from(value.abi_encode()))
    }

    pub fn with_raw<C: SolCall>(
        mut self,
        network: Network,
        to: Address,
        call: C,
        output: Bytes,
    ) -> Self {
        self.responses
            .insert((network, to, call.abi_encode()), Ok(output));
        self
    }

    /// Make `call` fail with a revert.
    pub fn with_revert<C: SolCall>(
        mut self,
        network: Network,
        to: Address,
        call: C,
        message: &str,
    ) -> Self {
        self.responses.insert(
            (network, to, call.abi_encode()),
            Err(ChainCallError::Rpc {
                code: 3,
                message: message.to_string(),
            }),
        );
        self
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn call(
        &self,
        network: Network,
        to: Address,
        calldata: Bytes,
    ) -> Result<Bytes, ChainCallError> {
        self.responses
            .get(&(network, to, calldata.to_vec()))
            .cloned()
            .unwrap_or_else(|| {
                Err(ChainCallError::Rpc {
                    code: -32000,
                    message: format!("no mocked response for call to {} on {}", to, network),
                })
            })
    }
}

/// Connector that hands out the same mock reader for every fork id.
#[derive(Debug, Clone)]
pub struct MockChainConnector {
    reader: Arc<MockChainReader>,
}

impl MockChainConnector {
    pub fn new(reader: MockChainReader) -> Self {
        Self {
            reader: Arc::new(reader),
        }
    }
}

impl ChainConnector for MockChainConnector {
    fn connect(&self, _fork_network_id: &str) -> Arc<dyn ChainReader> {
        self.reader.clone()
    }
}
