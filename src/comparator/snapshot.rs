//! Market parameters on one network, fetched at most once per analysis.
//!
//! Every check asks the snapshot instead of the chain, so all checks see the
//! same value for a parameter. A failed read is not cached: the check that
//! hit it fails, and a later check asking for the same field tries again.

use crate::chain::abi::{IERC20Metadata, IMarket};
use crate::chain::{self, ChainCallError, ChainReader};
use crate::domain::Network;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

pub struct MarketSnapshot {
    reader: Arc<dyn ChainReader>,
    network: Network,
    market: Address,
    collateral: Address,
    collateral_decimals: OnceCell<u8>,
    borrow_controller: OnceCell<Address>,
    oracle: OnceCell<Address>,
    collateral_factor: OnceCell<U256>,
    liquidation_incentive: OnceCell<U256>,
    liquidation_fee: OnceCell<U256>,
    debts: Mutex<HashMap<Address, U256>>,
}

impl MarketSnapshot {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        network: Network,
        market: Address,
        collateral: Address,
    ) -> Self {
        Self {
            reader,
            network,
            market,
            collateral,
            collateral_decimals: OnceCell::new(),
            borrow_controller: OnceCell::new(),
            oracle: OnceCell::new(),
            collateral_factor: OnceCell::new(),
            liquidation_incentive: OnceCell::new(),
            liquidation_fee: OnceCell::new(),
            debts: Mutex::new(HashMap::new()),
        }
    }

    pub async fn collateral_decimals(&self) -> Result<u8, ChainCallError> {
        self.cached(
            &self.collateral_decimals,
            self.collateral,
            IERC20Metadata::decimalsCall {},
        )
        .await
    }

    pub async fn borrow_controller(&self) -> Result<Address, ChainCallError> {
        self.cached(
            &self.borrow_controller,
            self.market,
            IMarket::borrowControllerCall {},
        )
        .await
    }

    pub async fn oracle(&self) -> Result<Address, ChainCallError> {
        self.cached(&self.oracle, self.market, IMarket::oracleCall {})
            .await
    }

    /// Raw bps as stored on chain.
    pub async fn collateral_factor(&self) -> Result<U256, ChainCallError> {
        self.cached(
            &self.collateral_factor,
            self.market,
            IMarket::collateralFactorBpsCall {},
        )
        .await
    }

    pub async fn liquidation_incentive(&self) -> Result<U256, ChainCallError> {
        self.cached(
            &self.liquidation_incentive,
            self.market,
            IMarket::liquidationIncentiveBpsCall {},
        )
        .await
    }

    pub async fn liquidation_fee(&self) -> Result<U256, ChainCallError> {
        self.cached(
            &self.liquidation_fee,
            self.market,
            IMarket::liquidationFeeBpsCall {},
        )
        .await
    }

    pub async fn debt(&self, account: Address) -> Result<U256, ChainCallError> {
        if let Some(debt) = self.debts.lock().await.get(&account) {
            return Ok(*debt);
        }
        let debt = chain::read(
            self.reader.as_ref(),
            self.network,
            self.market,
            &IMarket::debtsCall { user: account },
        )
        .await?;
        self.debts.lock().await.insert(account, debt);
        Ok(debt)
    }

    async fn cached<C>(
        &self,
        cell: &OnceCell<C::Return>,
        to: Address,
        call: C,
    ) -> Result<C::Return, ChainCallError>
    where
        C: SolCall + Sync,
        C::Return: Copy,
    {
        cell.get_or_try_init(|| chain::read(self.reader.as_ref(), self.network, to, &call))
            .await
            .copied()
    }
}

impl fmt::Debug for MarketSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketSnapshot")
            .field("network", &self.network)
            .field("market", &self.market)
            .field("collateral_factor", &self.collateral_factor.get())
            .field("oracle", &self.oracle.get())
            .field("borrow_controller", &self.borrow_controller.get())
            .finish_non_exhaustive()
    }
}
