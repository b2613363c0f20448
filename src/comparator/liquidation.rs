use super::{bps, CheckError, MarketComparator, MarketSnapshot};
use crate::domain::{Category, Decimal, Findings, LiquidationInfo, ParameterDelta};
use crate::engine::{
    assess_collateral_factor, assess_liquidation_incentive, max_safe_liquidation_incentive,
    self_liquidation_profitable,
};

/// Liquidation parameters on both networks; safety checks use the
/// post-change values only.
pub(super) async fn check(
    ctx: &MarketComparator,
    findings: &mut Findings,
) -> Result<LiquidationInfo, CheckError> {
    let collateral_factor = ctx
        .both(MarketSnapshot::collateral_factor)
        .await?
        .map(|v| bps(v, "collateral factor").map(i128::from))?;
    let incentive = ctx
        .both(MarketSnapshot::liquidation_incentive)
        .await?
        .map(|v| bps(v, "liquidation incentive").map(i128::from))?;
    let fee = ctx
        .both(MarketSnapshot::liquidation_fee)
        .await?
        .map(|v| bps(v, "liquidation fee").map(i128::from))?;

    report_change(findings, "Collateral factor", &collateral_factor);
    report_change(findings, "Liquidation incentive", &incentive);
    report_change(findings, "Liquidation fee", &fee);

    findings.record(
        Category::Liquidation,
        assess_collateral_factor(collateral_factor.after),
    );
    findings.record(
        Category::Liquidation,
        assess_liquidation_incentive(incentive.after),
    );

    let max_safe = max_safe_liquidation_incentive(collateral_factor.after);
    let profitable = self_liquidation_profitable(collateral_factor.after, incentive.after);
    if profitable {
        findings.error(
            Category::Liquidation,
            "Profitable Self-Liquidations are possible",
        );
    }

    Ok(LiquidationInfo {
        collateral_factor: percent(collateral_factor),
        liquidation_incentive: percent(incentive),
        liquidation_fee: percent(fee),
        max_safe_liquidation_incentive: max_safe.map(Decimal::percent_from_bps),
        profitable_self_liquidation_possible: profitable,
    })
}

fn report_change(findings: &mut Findings, label: &str, delta: &ParameterDelta<i128>) {
    if delta.changed() {
        findings.info(
            Category::Liquidation,
            format!(
                "{} changed from {}% to {}%",
                label,
                Decimal::percent_from_bps(delta.before),
                Decimal::percent_from_bps(delta.after)
            ),
        );
    }
}

fn percent(delta: ParameterDelta<i128>) -> ParameterDelta<Decimal> {
    ParameterDelta {
        before: Decimal::percent_from_bps(delta.before),
        after: Decimal::percent_from_bps(delta.after),
    }
}
