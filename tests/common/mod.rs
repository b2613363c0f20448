#![allow(dead_code)]

use alloy_primitives::{address, Address, U256};
use alloy_sol_types::SolEvent;
use market_checker::chain::abi::{IBorrowController, IDbr, IERC20Metadata, IMarket, IOracle};
use market_checker::chain::{MockChainConnector, MockChainReader};
use market_checker::domain::{AnalysisReport, Network, Severity};
use market_checker::logs::MockLogSource;
use market_checker::price::{MockPriceReference, PriceReference};
use market_checker::{EventLogSource, KnownContracts, MarketRiskService};
use std::str::FromStr;
use std::sync::Arc;

pub const MARKET: Address = address!("63Df5e23Db45a2066508318f172bA45B9CD37035");
pub const COLLATERAL: Address = address!("7f39C581F595B53c5cb19bD0b3f8dA6c935E2Ca0");
pub const OLD_CONTROLLER: Address = address!("44B7895989Bc7886423F06DeAa844D413384b0d6");
pub const OLD_ORACLE: Address = address!("E8A05Bd30a7F3b0F2bA5a9e3C9f5B8fA9E3cD2b1");
pub const FORK_ID: &str = "b0a8c2d4-6e1f-4a3b-9c5d-7e8f9a0b1c2d";

pub fn wad(whole: u64) -> U256 {
    U256::from(whole) * U256::from(1_000_000_000_000_000_000u64)
}

/// Market parameters as read on one network.
#[derive(Debug, Clone)]
pub struct MarketSide {
    pub borrow_controller: Address,
    pub oracle: Address,
    pub collateral_factor: u64,
    pub liquidation_incentive: u64,
    pub liquidation_fee: u64,
    pub min_debt: U256,
    pub daily_limit: U256,
}

impl Default for MarketSide {
    fn default() -> Self {
        let known = KnownContracts::default();
        Self {
            borrow_controller: known.newest_borrow_controller,
            oracle: known.newest_oracle,
            collateral_factor: 8000,
            liquidation_incentive: 1000,
            liquidation_fee: 1000,
            min_debt: wad(1000),
            daily_limit: wad(100_000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BorrowerFixture {
    pub account: Address,
    pub debt: U256,
    pub collateral_value: (U256, U256),
    pub credit_limit: (U256, U256),
    /// Number of Borrow events emitted for this account.
    pub borrow_events: usize,
}

impl BorrowerFixture {
    pub fn new(byte: u8, debt: U256, collateral_value: (U256, U256)) -> Self {
        Self {
            account: Address::repeat_byte(byte),
            debt,
            collateral_value,
            credit_limit: (U256::ZERO, U256::ZERO),
            borrow_events: 1,
        }
    }
}

/// A complete market on both networks, identical unless a test changes it.
#[derive(Debug, Clone)]
pub struct MarketFixture {
    pub live: MarketSide,
    pub fork: MarketSide,
    pub decimals: u8,
    /// Raw answer of the post-change oracle.
    pub oracle_price: U256,
    pub dbr_allowed: bool,
    pub borrowers: Vec<BorrowerFixture>,
    pub reference_price: Option<&'static str>,
}

impl Default for MarketFixture {
    fn default() -> Self {
        Self {
            live: MarketSide::default(),
            fork: MarketSide::default(),
            decimals: 18,
            oracle_price: wad(3000),
            dbr_allowed: true,
            borrowers: Vec::new(),
            reference_price: Some("3000"),
        }
    }
}

impl MarketFixture {
    pub fn reader(&self) -> MockChainReader {
        let mut reader = MockChainReader::new()
            .with_call(Network::Live, MARKET, IMarket::collateralCall {}, COLLATERAL)
            .with_call(
                Network::Live,
                COLLATERAL,
                IERC20Metadata::symbolCall {},
                "wstETH".to_string(),
            )
            .with_call(
                Network::Live,
                COLLATERAL,
                IERC20Metadata::nameCall {},
                "Wrapped liquid staked Ether 2.0".to_string(),
            )
            .with_call(
                Network::Live,
                COLLATERAL,
                IERC20Metadata::decimalsCall {},
                U256::from(self.decimals),
            )
            .with_call(
                Network::Live,
                KnownContracts::default().dbr,
                IDbr::marketsCall { market: MARKET },
                self.dbr_allowed,
            )
            .with_call(
                Network::Forked,
                self.fork.oracle,
                IOracle::getPriceCall {
                    token: COLLATERAL,
                    collateralFactorBps: U256::from(self.fork.collateral_factor),
                },
                self.oracle_price,
            );

        for (network, side) in [(Network::Live, &self.live), (Network::Forked, &self.fork)] {
            reader = reader
                .with_call(network, MARKET, IMarket::borrowControllerCall {}, side.borrow_controller)
                .with_call(network, MARKET, IMarket::oracleCall {}, side.oracle)
                .with_call(
                    network,
                    MARKET,
                    IMarket::collateralFactorBpsCall {},
                    U256::from(side.collateral_factor),
                )
                .with_call(
                    network,
                    MARKET,
                    IMarket::liquidationIncentiveBpsCall {},
                    U256::from(side.liquidation_incentive),
                )
                .with_call(
                    network,
                    MARKET,
                    IMarket::liquidationFeeBpsCall {},
                    U256::from(side.liquidation_fee),
                )
                .with_call(
                    network,
                    side.borrow_controller,
                    IBorrowController::minDebtsCall { market: MARKET },
                    side.min_debt,
                )
                .with_call(
                    network,
                    side.borrow_controller,
                    IBorrowController::dailyLimitsCall { market: MARKET },
                    side.daily_limit,
                );
        }

        for borrower in &self.borrowers {
            let user = borrower.account;
            reader = reader
                .with_call(Network::Live, MARKET, IMarket::debtsCall { user }, borrower.debt)
                .with_call(
                    Network::Live,
                    MARKET,
                    IMarket::getCollateralValueCall { user },
                    borrower.collateral_value.0,
                )
                .with_call(
                    Network::Forked,
                    MARKET,
                    IMarket::getCollateralValueCall { user },
                    borrower.collateral_value.1,
                )
                .with_call(
                    Network::Live,
                    MARKET,
                    IMarket::getCreditLimitCall { user },
                    borrower.credit_limit.0,
                )
                .with_call(
                    Network::Forked,
                    MARKET,
                    IMarket::getCreditLimitCall { user },
                    borrower.credit_limit.1,
                );
        }

        reader
    }

    pub fn log_source(&self) -> MockLogSource {
        let mut logs = MockLogSource::new().with_blocks(17_000_000, 19_000_000);
        for borrower in &self.borrowers {
            for _ in 0..borrower.borrow_events {
                logs = logs.with_borrow(
                    MARKET,
                    IMarket::Borrow::SIGNATURE_HASH,
                    borrower.account,
                    wad(1),
                );
            }
        }
        logs
    }

    pub fn prices(&self) -> MockPriceReference {
        match self.reference_price {
            Some(price) => MockPriceReference::available(
                market_checker::Decimal::from_str(price).expect("valid price"),
            ),
            None => MockPriceReference::unavailable("COINGECKO_API_KEY environment variable is not set"),
        }
    }

    pub fn service(&self) -> MarketRiskService {
        self.service_with(
            self.reader(),
            Arc::new(self.log_source()),
            Arc::new(self.prices()),
        )
    }

    pub fn service_with(
        &self,
        reader: MockChainReader,
        logs: Arc<dyn EventLogSource>,
        prices: Arc<dyn PriceReference>,
    ) -> MarketRiskService {
        MarketRiskService::new(
            Arc::new(MockChainConnector::new(reader)),
            logs,
            prices,
            KnownContracts::default(),
        )
    }

    pub async fn analyze(&self) -> AnalysisReport {
        self.service()
            .analyze_market(&format!("{:#x}", MARKET), FORK_ID)
            .await
            .expect("analysis should succeed")
    }
}

pub fn messages(report: &AnalysisReport, severity: Severity) -> Vec<String> {
    report
        .findings
        .iter()
        .filter(|f| f.severity == severity)
        .map(|f| f.message.clone())
        .collect()
}
