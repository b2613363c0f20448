//! Test doubles for price lookups.

use super::{PriceFeed, PriceFeedError, PriceQuote, PriceReference};
use crate::domain::Decimal;
use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Returns the same quote for every token.
#[derive(Debug, Clone)]
pub struct MockPriceReference {
    quote: PriceQuote,
}

impl MockPriceReference {
    pub fn available(price: Decimal) -> Self {
        Self {
            quote: PriceQuote::Available(price),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            quote: PriceQuote::Unavailable(reason.into()),
        }
    }
}

#[async_trait]
impl PriceReference for MockPriceReference {
    async fn lookup(&self, _token: Address) -> PriceQuote {
        self.quote.clone()
    }
}

/// Feed that replays a fixed sequence of responses, one per request.
#[derive(Debug)]
pub struct ScriptedPriceFeed {
    responses: Mutex<VecDeque<Result<Decimal, PriceFeedError>>>,
    calls: AtomicUsize,
}

impl ScriptedPriceFeed {
    pub fn new(responses: Vec<Result<Decimal, PriceFeedError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFeed for ScriptedPriceFeed {
    async fn fetch_usd_price(&self, _token: Address) -> Result<Decimal, PriceFeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .map_err(|_| PriceFeedError::Network("scripted feed poisoned".to_string()))?
            .pop_front();
        next.unwrap_or_else(|| Err(PriceFeedError::Network("script exhausted".to_string())))
    }
}
