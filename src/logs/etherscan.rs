//! Etherscan v2 API client for contract creation, chain head and log pages.

use super::{paginate, EventLogSource, LogEntry, LogSourceError};
use crate::domain::Network;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Maximum `offset` accepted by the v2 logs endpoint.
pub const PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct EtherscanLogSource {
    client: Client,
    base_url: String,
    api_key: String,
    chain_id: u64,
    page_delay: Duration,
}

impl EtherscanLogSource {
    pub fn new(
        client: Client,
        base_url: String,
        api_key: String,
        chain_id: u64,
        page_delay: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            chain_id,
            page_delay,
        }
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<serde_json::Value, LogSourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("chainid", self.chain_id.to_string())])
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| LogSourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LogSourceError::HttpStatus(status.as_u16()));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| LogSourceError::Parse(e.to_string()))
    }

    async fn fetch_page(
        &self,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
        page: u64,
    ) -> Result<Vec<LogEntry>, LogSourceError> {
        let params = [
            ("module", "logs".to_string()),
            ("action", "getLogs".to_string()),
            ("address", address.to_string()),
            ("fromBlock", from_block.to_string()),
            ("toBlock", to_block.to_string()),
            ("topic0", topic0.to_string()),
            ("page", page.to_string()),
            ("offset", PAGE_SIZE.to_string()),
        ];
        let body = self.get(&params).await?;
        let logs = parse_logs_response(&body)?;
        debug!("Page {}: {} logs", page, logs.len());

        if logs.len() == PAGE_SIZE && !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
        Ok(logs)
    }
}

#[async_trait]
impl EventLogSource for EtherscanLogSource {
    async fn creation_block(&self, address: Address) -> Result<u64, LogSourceError> {
        let params = [
            ("module", "contract".to_string()),
            ("action", "getcontractcreation".to_string()),
            ("contractaddresses", address.to_string()),
        ];
        let body = self.get(&params).await?;
        let block = parse_creation_block(&body)?;
        info!("Creation block of {}: {}", address, block);
        Ok(block)
    }

    async fn latest_block(&self) -> Result<u64, LogSourceError> {
        let params = [
            ("module", "proxy".to_string()),
            ("action", "eth_blockNumber".to_string()),
        ];
        let body = self.get(&params).await?;
        let head = body
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LogSourceError::Api(format!("eth_blockNumber failed: {}", body)))?;
        parse_hex_u64(head)
    }

    fn scan<'a>(
        &'a self,
        network: Network,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> BoxStream<'a, Result<LogEntry, LogSourceError>> {
        if network != Network::Live {
            return futures::stream::once(async move {
                Err::<LogEntry, _>(LogSourceError::UnsupportedNetwork(network))
            })
            .boxed();
        }

        paginate(PAGE_SIZE, move |page| {
            self.fetch_page(address, topic0, from_block, to_block, page)
        })
    }
}

fn parse_hex_u64(s: &str) -> Result<u64, LogSourceError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|e| LogSourceError::Parse(format!("Invalid hex quantity {}: {}", s, e)))
}

fn parse_creation_block(body: &serde_json::Value) -> Result<u64, LogSourceError> {
    let ok = body.get("status").and_then(|v| v.as_str()) == Some("1");
    let block = body
        .get("result")
        .and_then(|v| v.as_array())
        .and_then(|results| results.first())
        .and_then(|entry| entry.get("blockNumber"))
        .and_then(|v| v.as_str());

    match (ok, block) {
        (true, Some(block)) => block
            .parse::<u64>()
            .map_err(|e| LogSourceError::Parse(format!("Invalid blockNumber {}: {}", block, e))),
        _ => Err(LogSourceError::Api(format!("Creation lookup failed: {}", body))),
    }
}

/// A `getLogs` response. "No records found" comes back as status 0 with an
/// empty result and is an empty page, not an error.
fn parse_logs_response(body: &serde_json::Value) -> Result<Vec<LogEntry>, LogSourceError> {
    match body.get("result") {
        Some(serde_json::Value::Array(entries)) => entries.iter().map(parse_log_entry).collect(),
        Some(serde_json::Value::Null) | None => Ok(Vec::new()),
        Some(other) => {
            let message = body
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            Err(LogSourceError::Api(format!("{}: {}", message, other)))
        }
    }
}

fn parse_log_entry(entry: &serde_json::Value) -> Result<LogEntry, LogSourceError> {
    let field = |name: &str| {
        entry
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| LogSourceError::Parse(format!("Missing {} field", name)))
    };

    let address = Address::from_str(field("address")?)
        .map_err(|e| LogSourceError::Parse(format!("Invalid address: {}", e)))?;

    let block_number = parse_hex_u64(field("blockNumber")?)?;

    let transaction_hash = entry
        .get("transactionHash")
        .and_then(|v| v.as_str())
        .and_then(|s| B256::from_str(s).ok());

    let topics = entry
        .get("topics")
        .and_then(|v| v.as_array())
        .ok_or_else(|| LogSourceError::Parse("Missing topics field".to_string()))?
        .iter()
        .filter_map(|t| t.as_str())
        .map(|t| {
            B256::from_str(t).map_err(|e| LogSourceError::Parse(format!("Invalid topic: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = field("data")?;
    let data = hex::decode(data.strip_prefix("0x").unwrap_or(data))
        .map(Bytes::from)
        .map_err(|e| LogSourceError::Parse(format!("Invalid data: {}", e)))?;

    Ok(LogEntry {
        address,
        block_number,
        transaction_hash,
        topics,
        data,
    })
}
