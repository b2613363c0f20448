//! JSON-RPC `eth_call` client for the live and forked networks.

use super::{ChainCallError, ChainConnector, ChainReader};
use crate::domain::Network;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Chain reader speaking JSON-RPC over HTTP to two endpoints.
#[derive(Debug)]
pub struct JsonRpcChainReader {
    client: Client,
    live_url: String,
    fork_url: String,
    next_id: AtomicU64,
}

impl JsonRpcChainReader {
    pub fn new(client: Client, live_url: String, fork_url: String) -> Self {
        Self {
            client,
            live_url,
            fork_url,
            next_id: AtomicU64::new(1),
        }
    }

    fn url(&self, network: Network) -> &str {
        match network {
            Network::Live => &self.live_url,
            Network::Forked => &self.fork_url,
        }
    }
}

#[async_trait]
impl ChainReader for JsonRpcChainReader {
    async fn call(
        &self,
        network: Network,
        to: Address,
        calldata: Bytes,
    ) -> Result<Bytes, ChainCallError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let selector = calldata.get(..4).map(hex::encode).unwrap_or_default();
        debug!("eth_call id={} network={} to={} selector=0x{}", id, network, to, selector);

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [
                {
                    "to": to.to_string(),
                    "data": format!("0x{}", hex::encode(&calldata)),
                },
                "latest"
            ]
        });

        let response = self
            .client
            .post(self.url(network))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainCallError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainCallError::HttpStatus(status.as_u16()));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ChainCallError::MalformedResponse(e.to_string()))?;

        parse_rpc_response(&body)
    }
}

/// Extract the hex `result` of a JSON-RPC response, or its error object.
fn parse_rpc_response(body: &serde_json::Value) -> Result<Bytes, ChainCallError> {
    if let Some(error) = body.get("error") {
        let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Err(ChainCallError::Rpc { code, message });
    }

    let result = body
        .get("result")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ChainCallError::MalformedResponse("Missing result field".to_string()))?;

    let hex_data = result.strip_prefix("0x").unwrap_or(result);
    hex::decode(hex_data)
        .map(Bytes::from)
        .map_err(|e| ChainCallError::MalformedResponse(format!("Invalid hex result: {}", e)))
}

/// Builds readers whose fork endpoint is derived from the fork network id.
#[derive(Debug, Clone)]
pub struct JsonRpcConnector {
    client: Client,
    live_url: String,
    fork_url_template: String,
    fixed_fork_url: Option<String>,
}

pub const FORK_ID_PLACEHOLDER: &str = "{vnet_id}";

impl JsonRpcConnector {
    pub fn new(
        client: Client,
        live_url: String,
        fork_url_template: String,
        fixed_fork_url: Option<String>,
    ) -> Self {
        Self {
            client,
            live_url,
            fork_url_template,
            fixed_fork_url,
        }
    }

    pub fn fork_url(&self, fork_network_id: &str) -> String {
        match &self.fixed_fork_url {
            Some(url) => url.clone(),
            None => self
                .fork_url_template
                .replace(FORK_ID_PLACEHOLDER, fork_network_id),
        }
    }
}

impl ChainConnector for JsonRpcConnector {
    fn connect(&self, fork_network_id: &str) -> Arc<dyn ChainReader> {
        Arc::new(JsonRpcChainReader::new(
            self.client.clone(),
            self.live_url.clone(),
            self.fork_url(fork_network_id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rpc_result() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0x0000000000000000000000000000000000000000000000000000000000001f40"
        });
        let bytes = parse_rpc_response(&body).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[30..], &[0x1fu8, 0x40][..]);
    }

    #[test]
    fn test_parse_rpc_revert() {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 3, "message": "execution reverted", "data": "0x"}
        });
        let err = parse_rpc_response(&body).unwrap_err();
        assert_eq!(
            err,
            ChainCallError::Rpc {
                code: 3,
                message: "execution reverted".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rpc_missing_result() {
        let body = serde_json::json!({"jsonrpc": "2.0", "id": 1});
        assert!(matches!(
            parse_rpc_response(&body),
            Err(ChainCallError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_fork_url_from_template() {
        let connector = JsonRpcConnector::new(
            Client::new(),
            "https://eth.example".to_string(),
            "https://virtual.mainnet.rpc.tenderly.co/{vnet_id}".to_string(),
            None,
        );
        assert_eq!(
            connector.fork_url("abc-123"),
            "https://virtual.mainnet.rpc.tenderly.co/abc-123"
        );
    }

    #[test]
    fn test_fixed_fork_url_wins() {
        let connector = JsonRpcConnector::new(
            Client::new(),
            "https://eth.example".to_string(),
            "https://virtual.mainnet.rpc.tenderly.co/{vnet_id}".to_string(),
            Some("http://localhost:8545".to_string()),
        );
        assert_eq!(connector.fork_url("ignored"), "http://localhost:8545");
    }
}
