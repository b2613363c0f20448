//! External USD price reference used to sanity-check oracle answers.

use crate::domain::Decimal;
use alloy_primitives::Address;
use async_trait::async_trait;
use backoff::backoff::Constant;
use backoff::future::retry;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub mod coingecko;
pub mod mock;

pub use coingecko::CoingeckoFeed;
pub use mock::{MockPriceReference, ScriptedPriceFeed};

/// Outcome of a reference price lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceQuote {
    Available(Decimal),
    /// No usable price; the reason ends up in the skipped-comparison warning.
    Unavailable(String),
}

/// Source of reference USD prices. Never fails: problems become `Unavailable`.
#[async_trait]
pub trait PriceReference: Send + Sync + fmt::Debug {
    async fn lookup(&self, token: Address) -> PriceQuote;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceFeedError {
    #[error("rate limited")]
    RateLimited,
    #[error("HTTP error {0}")]
    HttpStatus(u16),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("no USD price listed for {0}")]
    NotListed(Address),
    #[error("{0}")]
    NotConfigured(String),
}

/// A single-shot price request against a remote API.
#[async_trait]
pub trait PriceFeed: Send + Sync + fmt::Debug {
    async fn fetch_usd_price(&self, token: Address) -> Result<Decimal, PriceFeedError>;
}

/// Wraps a feed, retrying rate-limited requests with a constant delay.
///
/// The first request plus at most `max_retries` retries are made; any other
/// error ends the lookup immediately.
#[derive(Debug)]
pub struct RetryingPriceReference<F> {
    feed: F,
    max_retries: u32,
    delay: Duration,
}

impl<F: PriceFeed> RetryingPriceReference<F> {
    pub fn new(feed: F, max_retries: u32, delay: Duration) -> Self {
        Self {
            feed,
            max_retries,
            delay,
        }
    }

    async fn fetch_with_retry(&self, token: Address) -> Result<Decimal, PriceFeedError> {
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let feed = &self.feed;
        let max_retries = self.max_retries;

        retry(Constant::new(self.delay), move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            match feed.fetch_usd_price(token).await {
                Ok(price) => Ok(price),
                Err(PriceFeedError::RateLimited) if attempt < max_retries => {
                    warn!(
                        "Price feed rate limited for {} (retry {}/{})",
                        token,
                        attempt + 1,
                        max_retries
                    );
                    Err(backoff::Error::transient(PriceFeedError::RateLimited))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }
}

#[async_trait]
impl<F: PriceFeed> PriceReference for RetryingPriceReference<F> {
    async fn lookup(&self, token: Address) -> PriceQuote {
        match self.fetch_with_retry(token).await {
            Ok(price) => {
                debug!("Reference price for {}: ${}", token, price);
                PriceQuote::Available(price)
            }
            Err(e) => PriceQuote::Unavailable(e.to_string()),
        }
    }
}
