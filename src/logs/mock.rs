//! In-memory log source for tests.

use super::{EventLogSource, LogEntry, LogSourceError};
use crate::domain::Network;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

#[derive(Debug, Clone, Default)]
pub struct MockLogSource {
    logs: Vec<LogEntry>,
    creation_block: u64,
    latest_block: u64,
    failure: Option<LogSourceError>,
}

impl MockLogSource {
    pub fn new() -> Self {
        Self {
            latest_block: u64::MAX,
            ..Self::default()
        }
    }

    pub fn with_log(mut self, log: LogEntry) -> Self {
        self.logs.push(log);
        self
    }

    /// Add a `Borrow(account, amount)` log emitted by `market`.
    pub fn with_borrow(self, market: Address, topic0: B256, account: Address, amount: U256) -> Self {
        let block_number = self.creation_block + self.logs.len() as u64;
        self.with_log(LogEntry {
            address: market,
            block_number,
            transaction_hash: None,
            topics: vec![topic0, account.into_word()],
            data: Bytes::from(amount.to_be_bytes::<32>().to_vec()),
        })
    }

    pub fn with_blocks(mut self, creation_block: u64, latest_block: u64) -> Self {
        self.creation_block = creation_block;
        self.latest_block = latest_block;
        self
    }

    /// Make every request fail.
    pub fn with_failure(mut self, error: LogSourceError) -> Self {
        self.failure = Some(error);
        self
    }
}

#[async_trait]
impl EventLogSource for MockLogSource {
    async fn creation_block(&self, _address: Address) -> Result<u64, LogSourceError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.creation_block),
        }
    }

    async fn latest_block(&self) -> Result<u64, LogSourceError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.latest_block),
        }
    }

    fn scan<'a>(
        &'a self,
        network: Network,
        address: Address,
        topic0: B256,
        from_block: u64,
        to_block: u64,
    ) -> BoxStream<'a, Result<LogEntry, LogSourceError>> {
        if let Some(err) = &self.failure {
            return stream::once(futures::future::ready(Err(err.clone()))).boxed();
        }
        if network != Network::Live {
            return stream::once(futures::future::ready(Err(
                LogSourceError::UnsupportedNetwork(network),
            )))
            .boxed();
        }

        stream::iter(self.logs.iter().filter(move |log| {
            log.address == address
                && log.topics.first() == Some(&topic0)
                && (from_block..=to_block).contains(&log.block_number)
        }))
        .map(|log| Ok(log.clone()))
        .boxed()
    }
}
