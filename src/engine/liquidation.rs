//! Liquidation parameter thresholds and the self-liquidation bound.

use crate::domain::Assessment;

/// 100% expressed in basis points.
pub const BPS_SCALE: i128 = 10_000;

const COLLATERAL_FACTOR_WARN_BPS: i128 = 9_000;
const INCENTIVE_MIN_BPS: i128 = 500;
const INCENTIVE_MAX_BPS: i128 = 2_000;

/// Highest liquidation incentive (bps) at which liquidating a position sitting
/// exactly at the collateral factor does not pay out more collateral than the
/// position holds: `floor((10000 - cf) * 10000 / cf)`.
///
/// Returns `None` for a zero collateral factor, where no bound exists.
pub fn max_safe_liquidation_incentive(collateral_factor_bps: i128) -> Option<i128> {
    if collateral_factor_bps == 0 {
        return None;
    }
    Some(((BPS_SCALE - collateral_factor_bps) * BPS_SCALE).div_euclid(collateral_factor_bps))
}

/// Whether a borrower could profit by liquidating their own position.
pub fn self_liquidation_profitable(collateral_factor_bps: i128, incentive_bps: i128) -> bool {
    max_safe_liquidation_incentive(collateral_factor_bps)
        .map(|max_safe| incentive_bps > max_safe)
        .unwrap_or(false)
}

pub fn assess_collateral_factor(collateral_factor_bps: i128) -> Option<Assessment> {
    if collateral_factor_bps == 0 {
        Some(Assessment::error("Collateral Factor is 0%"))
    } else if collateral_factor_bps == BPS_SCALE {
        Some(Assessment::error("Collateral Factor is 100%"))
    } else if collateral_factor_bps > COLLATERAL_FACTOR_WARN_BPS {
        Some(Assessment::warning("Collateral Factor is above 90%"))
    } else {
        None
    }
}

pub fn assess_liquidation_incentive(incentive_bps: i128) -> Option<Assessment> {
    if incentive_bps == 0 {
        Some(Assessment::error("Liquidation incentive is 0%"))
    } else if incentive_bps < INCENTIVE_MIN_BPS {
        Some(Assessment::warning("Liquidation incentive is below 5%"))
    } else if incentive_bps > INCENTIVE_MAX_BPS {
        Some(Assessment::warning("Liquidation incentive is above 20%"))
    } else {
        None
    }
}
