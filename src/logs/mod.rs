//! Event log source abstraction: paginated, lazily consumed log scans.

use crate::domain::Network;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use thiserror::Error;

pub mod etherscan;
pub mod mock;

pub use etherscan::EtherscanLogSource;
pub use mock::MockLogSource;

/// One raw log entry as returned by the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub block_number: u64,
    pub transaction_hash: Option<B256>,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Decoded `Borrow(address indexed account, uint256 amount)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowEvent {
    pub account: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogSourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {0}")]
    HttpStatus(u16),
    #[error("Explorer error: {0}")]
    Api(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("log scans are not supported on the {0} network")]
    UnsupportedNetwork(Network),
}

/// Source of historical contract logs.
///
/// `scan` returns a fresh stream on every call; dropping it early stops
/// fetching further pages.
#[async_trait]
pub trait EventLogSource: Send + Sync + fmt::Debug {
    /// Block in which `address` was deployed.
    async fn creation_block(&self, address: Address) -> Result<u64, LogSourceError>;

    /// Current chain head.
    async fn latest_block(&self) -> Result<u64, LogSourceError>;

    /// All logs emitted by `address` with `topic0`, in `from_block..=to_block`.
    fn scan<'a>(
        &'a self,
        network: Network,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> BoxStream<'a, Result<LogEntry, LogSourceError>>;
}

/// Drive a page-limited fetcher: request pages 1, 2, ... and stop after the
/// first page shorter than `page_size`.
pub fn paginate<'a, F, Fut>(
    page_size: usize,
    fetch_page: F,
) -> BoxStream<'a, Result<LogEntry, LogSourceError>>
where
    F: FnMut(u64) -> Fut + Send + 'a,
    Fut: Future<Output = Result<Vec<LogEntry>, LogSourceError>> + Send + 'a,
{
    stream::try_unfold((Some(1u64), fetch_page), move |(page, mut fetch_page)| async move {
        let Some(page) = page else {
            return Ok(None);
        };
        let logs = fetch_page(page).await?;
        let next = if logs.len() < page_size { None } else { Some(page + 1) };
        Ok(Some((logs, (next, fetch_page))))
    })
    .map_ok(|logs| stream::iter(logs.into_iter().map(Ok::<_, LogSourceError>)))
    .try_flatten()
    .boxed()
}

/// Decode a Borrow log: account from the last 20 bytes of `topics[1]`,
/// amount from the first data word.
pub fn decode_borrow(log: &LogEntry) -> Result<BorrowEvent, LogSourceError> {
    let account_topic = log
        .topics
        .get(1)
        .ok_or_else(|| LogSourceError::Parse("Missing indexed borrower in topics[1]".to_string()))?;

    let amount_word = log
        .data
        .get(..32)
        .ok_or_else(|| LogSourceError::Parse("Missing uint256 amount in data".to_string()))?;

    Ok(BorrowEvent {
        account: Address::from_word(*account_topic),
        amount: U256::from_be_slice(amount_word),
    })
}

/// Distinct borrower accounts, in order of first appearance.
#[derive(Debug, Default)]
pub struct BorrowerSet {
    seen: HashSet<Address>,
    ordered: Vec<Address>,
    events: usize,
}

impl BorrowerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event: &BorrowEvent) {
        self.events += 1;
        if self.seen.insert(event.account) {
            self.ordered.push(event.account);
        }
    }

    /// Number of events observed, duplicates included.
    pub fn events(&self) -> usize {
        self.events
    }

    pub fn into_accounts(self) -> Vec<Address> {
        self.ordered
    }
}

/// Consume a borrow-log stream into the set of distinct borrowers.
pub async fn collect_borrowers(
    mut logs: BoxStream<'_, Result<LogEntry, LogSourceError>>,
) -> Result<BorrowerSet, LogSourceError> {
    let mut borrowers = BorrowerSet::new();
    while let Some(log) = logs.try_next().await? {
        borrowers.insert(&decode_borrow(&log)?);
    }
    Ok(borrowers)
}
