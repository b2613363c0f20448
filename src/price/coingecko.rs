//! Coingecko token price API.

use super::{PriceFeed, PriceFeedError};
use crate::domain::Decimal;
use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

const API_KEY_HEADER: &str = "x-cg-pro-api-key";

#[derive(Debug, Clone)]
pub struct CoingeckoFeed {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    platform: String,
}

impl CoingeckoFeed {
    pub fn new(client: Client, base_url: String, api_key: Option<String>, platform: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            platform,
        }
    }
}

#[async_trait]
impl PriceFeed for CoingeckoFeed {
    async fn fetch_usd_price(&self, token: Address) -> Result<Decimal, PriceFeedError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PriceFeedError::NotConfigured(
                "COINGECKO_API_KEY environment variable is not set".to_string(),
            )
        })?;

        let contract = format!("{:#x}", token);
        let url = format!("{}/simple/token_price/{}", self.base_url, self.platform);
        debug!("Fetching Coingecko price for {}", contract);

        let response = self
            .client
            .get(&url)
            .query(&[("contract_addresses", contract.as_str()), ("vs_currencies", "usd")])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|e| PriceFeedError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceFeedError::RateLimited);
        }
        if !status.is_success() {
            return Err(PriceFeedError::HttpStatus(status.as_u16()));
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| PriceFeedError::Parse(e.to_string()))?;

        parse_token_price(&body, token)
    }
}

/// Pick `body[<lowercase address>].usd` out of a `simple/token_price` response.
fn parse_token_price(body: &serde_json::Value, token: Address) -> Result<Decimal, PriceFeedError> {
    let key = format!("{:#x}", token);
    let usd = body
        .get(&key)
        .and_then(|entry| entry.get("usd"))
        .ok_or(PriceFeedError::NotListed(token))?;

    let usd = usd
        .as_f64()
        .ok_or_else(|| PriceFeedError::Parse(format!("Non-numeric usd price: {}", usd)))?;
    Decimal::try_from_f64(usd).map_err(|e| PriceFeedError::Parse(e.to_string()))
}
