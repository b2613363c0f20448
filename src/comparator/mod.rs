//! Market risk comparator: diffs a market's live configuration against the
//! same market on a forked network where a governance change was applied.
//!
//! Only the initial collateral lookup is fatal. Every later check runs in
//! isolation: a failure becomes a `Section::Failed` plus an error finding and
//! the remaining checks still run. Shared market parameters come from one
//! `MarketSnapshot` per network, so every check sees the same values.

mod borrow_controller;
mod liquidation;
mod market;
mod oracle;
mod positions;
mod snapshot;

use crate::chain::{self, abi::IMarket, ChainCallError, ChainConnector, ChainReader};
use crate::domain::{
    resolve_checksum_address, AnalysisReport, Category, DecimalError, FindingSummary, Findings,
    InvalidAddressError, Network, ParameterDelta, Section,
};
use crate::logs::{EventLogSource, LogSourceError};
use crate::price::PriceReference;
use snapshot::MarketSnapshot;
use alloy_primitives::{address, Address};
use alloy_sol_types::SolCall;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Reference contracts every market is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownContracts {
    pub newest_borrow_controller: Address,
    pub newest_oracle: Address,
    /// DBR token, which keeps the registry of allowed markets.
    pub dbr: Address,
}

impl Default for KnownContracts {
    fn default() -> Self {
        Self {
            newest_borrow_controller: address!("01ECA33e20a4c379Bd8A5361f896A7dd2bAE4ce8"),
            newest_oracle: address!("aBe146CF570FD27ddD985895ce9B138a7110cce8"),
            dbr: address!("AD038Eb671c44b853887A7E32528FaB35dC5D710"),
        }
    }
}

/// Errors that abort an analysis before any report exists.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddressError),
    #[error("Invalid fork network id: {0:?}")]
    InvalidForkNetwork(String),
    #[error("Failed to read market collateral: {0}")]
    CollateralLookup(#[source] ChainCallError),
}

/// Failure of a single check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Chain(#[from] ChainCallError),
    #[error(transparent)]
    Logs(#[from] LogSourceError),
    #[error(transparent)]
    Decimal(#[from] DecimalError),
}

/// One market bound to one pair of networks.
#[derive(Debug)]
pub struct MarketComparator {
    reader: Arc<dyn ChainReader>,
    logs: Arc<dyn EventLogSource>,
    prices: Arc<dyn PriceReference>,
    contracts: KnownContracts,
    market: Address,
    collateral: Address,
    live: MarketSnapshot,
    fork: MarketSnapshot,
}

impl MarketComparator {
    /// Resolve the market's collateral token on the live network.
    pub async fn connect(
        reader: Arc<dyn ChainReader>,
        logs: Arc<dyn EventLogSource>,
        prices: Arc<dyn PriceReference>,
        contracts: KnownContracts,
        market: Address,
    ) -> Result<Self, AnalysisError> {
        let collateral = chain::read(
            reader.as_ref(),
            Network::Live,
            market,
            &IMarket::collateralCall {},
        )
        .await
        .map_err(AnalysisError::CollateralLookup)?;

        info!("Market {} uses collateral {}", market, collateral);

        let live = MarketSnapshot::new(reader.clone(), Network::Live, market, collateral);
        let fork = MarketSnapshot::new(reader.clone(), Network::Forked, market, collateral);

        Ok(Self {
            reader,
            logs,
            prices,
            contracts,
            market,
            collateral,
            live,
            fork,
        })
    }

    /// Run all checks in order and assemble the report.
    pub async fn analyze(&self, fork_network_id: &str) -> AnalysisReport {
        let mut findings = Findings::new();

        let market = market::check(self, &mut findings).await;

        let result = borrow_controller::check(self, &mut findings).await;
        let borrow_controller = settle(
            &mut findings,
            Category::BorrowController,
            "check borrow controller",
            result,
        );

        let result = oracle::check(self, &mut findings).await;
        let oracle = settle(&mut findings, Category::Oracle, "check oracle", result);

        let result = liquidation::check(self, &mut findings).await;
        let liquidation = settle(
            &mut findings,
            Category::Liquidation,
            "check liquidation parameters",
            result,
        );

        let result = positions::check(self, &mut findings).await;
        let active_positions = settle(
            &mut findings,
            Category::ActivePositions,
            "get active borrowers",
            result,
        );

        let findings = findings.into_vec();
        let summary = FindingSummary::from_findings(&findings);
        info!(
            "Analysis of {} complete: {} errors, {} warnings, {} info",
            self.market, summary.errors, summary.warnings, summary.info
        );

        AnalysisReport {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            fork_network_id: fork_network_id.to_string(),
            market,
            borrow_controller,
            oracle,
            liquidation,
            active_positions,
            summary,
            findings,
        }
    }

    /// The same snapshot field on both networks.
    async fn both<'a, T, F, Fut>(&'a self, field: F) -> Result<ParameterDelta<T>, ChainCallError>
    where
        F: Fn(&'a MarketSnapshot) -> Fut,
        Fut: Future<Output = Result<T, ChainCallError>>,
    {
        Ok(ParameterDelta {
            before: field(&self.live).await?,
            after: field(&self.fork).await?,
        })
    }

    async fn read<C>(
        &self,
        network: Network,
        to: Address,
        call: C,
    ) -> Result<C::Return, ChainCallError>
    where
        C: SolCall + Sync,
    {
        chain::read(self.reader.as_ref(), network, to, &call).await
    }

    /// Same call on both networks: `before` against `targets.before` on the
    /// live network, `after` against `targets.after` on the fork.
    async fn read_pair<C>(
        &self,
        targets: ParameterDelta<Address>,
        call: C,
    ) -> Result<ParameterDelta<C::Return>, ChainCallError>
    where
        C: SolCall + Sync,
    {
        let reader = self.reader.as_ref();
        let before = chain::read(reader, Network::Live, targets.before, &call).await?;
        let after = chain::read(reader, Network::Forked, targets.after, &call).await?;
        Ok(ParameterDelta { before, after })
    }

    /// A market getter on both networks.
    async fn read_market<C>(&self, call: C) -> Result<ParameterDelta<C::Return>, ChainCallError>
    where
        C: SolCall + Sync,
    {
        self.read_pair(ParameterDelta { before: self.market, after: self.market }, call)
            .await
    }
}

/// Turn a check result into a report section, recording failures.
fn settle<T>(
    findings: &mut Findings,
    category: Category,
    action: &str,
    result: Result<T, CheckError>,
) -> Section<T> {
    match result {
        Ok(data) => Section::Complete(data),
        Err(e) => {
            warn!("Failed to {}: {}", action, e);
            findings.error(category, format!("Failed to {}: {}", action, e));
            Section::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Narrow a basis-point value read from chain.
fn bps(value: alloy_primitives::U256, what: &'static str) -> Result<u64, ChainCallError> {
    u64::try_from(value).map_err(|_| ChainCallError::OutOfRange {
        what,
        value: value.to_string(),
    })
}

/// Fork network ids end up in an RPC URL path.
pub fn validate_fork_network_id(id: &str) -> Result<(), AnalysisError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AnalysisError::InvalidForkNetwork(id.to_string()))
    }
}

/// Entry point shared by the HTTP API and the CLI.
#[derive(Debug, Clone)]
pub struct MarketRiskService {
    connector: Arc<dyn ChainConnector>,
    logs: Arc<dyn EventLogSource>,
    prices: Arc<dyn PriceReference>,
    contracts: KnownContracts,
}

impl MarketRiskService {
    pub fn new(
        connector: Arc<dyn ChainConnector>,
        logs: Arc<dyn EventLogSource>,
        prices: Arc<dyn PriceReference>,
        contracts: KnownContracts,
    ) -> Self {
        Self {
            connector,
            logs,
            prices,
            contracts,
        }
    }

    pub async fn analyze_market(
        &self,
        market_address: &str,
        fork_network_id: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let market = resolve_checksum_address(market_address)?;
        validate_fork_network_id(fork_network_id)?;

        info!("Analyzing market {} against fork {}", market, fork_network_id);

        let comparator = MarketComparator::connect(
            self.connector.connect(fork_network_id),
            self.logs.clone(),
            self.prices.clone(),
            self.contracts,
            market,
        )
        .await?;

        Ok(comparator.analyze(fork_network_id).await)
    }
}
