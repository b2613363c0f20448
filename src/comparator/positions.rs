use super::{bps, CheckError, MarketComparator};
use crate::chain::abi::IMarket;
use crate::domain::{
    ActivePositions, BorrowerPosition, Category, Decimal, Findings, Network, ParameterDelta,
};
use crate::engine::{is_liquidateable, loan_to_value};
use crate::logs::collect_borrowers;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolEvent;
use tracing::{debug, info};

/// How the change affects every borrower that still carries debt.
pub(super) async fn check(
    ctx: &MarketComparator,
    findings: &mut Findings,
) -> Result<ActivePositions, CheckError> {
    let from_block = ctx.logs.creation_block(ctx.market).await?;
    let to_block = ctx.logs.latest_block().await?;
    let borrow_logs = ctx.logs.scan(
        Network::Live,
        ctx.market,
        IMarket::Borrow::SIGNATURE_HASH,
        from_block,
        to_block,
    );
    let borrowers = collect_borrowers(borrow_logs).await?;
    let borrow_events_scanned = borrowers.events();

    let mut active = Vec::new();
    for account in borrowers.into_accounts() {
        let debt = ctx.live.debt(account).await?;
        if !debt.is_zero() {
            active.push((account, debt));
        }
    }
    info!(
        "{} borrow events in blocks {}..={}, {} active borrowers",
        borrow_events_scanned,
        from_block,
        to_block,
        active.len()
    );

    let mut positions = Vec::new();
    if !active.is_empty() {
        let collateral_factor = bps(ctx.fork.collateral_factor().await?, "collateral factor")?;

        for &(account, debt) in &active {
            match compare_borrower(ctx, account, debt, collateral_factor).await {
                Ok(Some(position)) => {
                    if position.liquidateable {
                        if position.loan_to_value.after.is_infinite() {
                            findings.error(
                                Category::ActivePositions,
                                format!(
                                    "Account {} has zero collateral value but positive debt",
                                    account
                                ),
                            );
                        } else {
                            findings.warning(
                                Category::ActivePositions,
                                format!(
                                    "Account {} will be liquidateable after the change",
                                    account
                                ),
                            );
                        }
                    }
                    positions.push(position);
                }
                Ok(None) => debug!("Borrower {} unaffected", account),
                Err(e) => findings.error(
                    Category::ActivePositions,
                    format!("Failed to check borrower {}: {}", account, e),
                ),
            }
        }
    }

    Ok(ActivePositions {
        borrow_events_scanned,
        active_borrowers: active.len(),
        borrowers: positions,
    })
}

/// `None` when neither collateral value nor credit limit moved.
async fn compare_borrower(
    ctx: &MarketComparator,
    account: Address,
    debt: U256,
    collateral_factor_bps: u64,
) -> Result<Option<BorrowerPosition>, CheckError> {
    let collateral_value = ctx
        .read_market(IMarket::getCollateralValueCall { user: account })
        .await?;
    let credit_limit = ctx
        .read_market(IMarket::getCreditLimitCall { user: account })
        .await?;

    if !collateral_value.changed() && !credit_limit.changed() {
        return Ok(None);
    }

    let loan_to_value = ParameterDelta {
        before: loan_to_value(debt, collateral_value.before)?,
        after: loan_to_value(debt, collateral_value.after)?,
    };
    let liquidateable = is_liquidateable(debt, collateral_value.after, collateral_factor_bps);

    Ok(Some(BorrowerPosition {
        address: account,
        debt: Decimal::from_wad(debt)?,
        collateral_value: collateral_value.map(Decimal::from_wad)?,
        credit_limit: credit_limit.map(Decimal::from_wad)?,
        loan_to_value,
        liquidateable,
    }))
}
