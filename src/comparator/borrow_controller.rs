use super::{CheckError, MarketComparator, MarketSnapshot};
use crate::chain::abi::IBorrowController;
use crate::domain::{BorrowControllerInfo, Category, Decimal, Findings, ParameterDelta};
use alloy_primitives::U256;
use tracing::debug;

/// Each network is asked through its own borrow controller.
pub(super) async fn check(
    ctx: &MarketComparator,
    findings: &mut Findings,
) -> Result<BorrowControllerInfo, CheckError> {
    let address = ctx.both(MarketSnapshot::borrow_controller).await?;
    debug!("Borrow controller: {} -> {}", address.before, address.after);

    let is_newest = address.after == ctx.contracts.newest_borrow_controller;
    if !is_newest {
        findings.warning(
            Category::BorrowController,
            "BorrowController isn't newest implementation",
        );
    }
    if address.changed() {
        findings.info(
            Category::BorrowController,
            format!(
                "Borrow controller address changed from {} to {}",
                address.before, address.after
            ),
        );
    }

    let min_debt = ctx
        .read_pair(address, IBorrowController::minDebtsCall { market: ctx.market })
        .await?;
    let min_debt_changed = min_debt.changed();
    let min_debt = usd(min_debt);
    if min_debt_changed {
        findings.info(
            Category::BorrowController,
            format!(
                "Min debt changed from ${} to ${}",
                min_debt.before, min_debt.after
            ),
        );
    }

    let daily_limit = ctx
        .read_pair(address, IBorrowController::dailyLimitsCall { market: ctx.market })
        .await?;
    let daily_limit_changed = daily_limit.changed();
    let daily_limit = usd(daily_limit);
    if daily_limit_changed {
        findings.info(
            Category::BorrowController,
            format!(
                "Daily limit changed from ${} to ${}",
                daily_limit.before, daily_limit.after
            ),
        );
    }

    Ok(BorrowControllerInfo {
        address,
        is_newest,
        min_debt,
        daily_limit,
    })
}

/// Limits may hold a max-uint "unlimited" sentinel, so they saturate.
fn usd(raw: ParameterDelta<U256>) -> ParameterDelta<Decimal> {
    ParameterDelta {
        before: Decimal::from_wad_saturating(raw.before),
        after: Decimal::from_wad_saturating(raw.after),
    }
}
