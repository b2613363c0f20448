//! Loan-to-value and liquidation eligibility of a single borrower.

use super::liquidation::BPS_SCALE;
use crate::domain::{Decimal, DecimalError, LoanToValue};
use alloy_primitives::U256;

/// `debt / collateral_value` as a percentage.
///
/// Zero collateral is `Infinite` when debt is positive and `0%` when there is
/// no debt either.
pub fn loan_to_value(debt: U256, collateral_value: U256) -> Result<LoanToValue, DecimalError> {
    if collateral_value.is_zero() {
        return Ok(if debt.is_zero() {
            LoanToValue::Finite(Decimal::zero())
        } else {
            LoanToValue::Infinite
        });
    }

    let debt = Decimal::from_wad(debt)?;
    let collateral = Decimal::from_wad(collateral_value)?;
    debt.checked_div(collateral)
        .and_then(|ratio| ratio.checked_mul(Decimal::hundred()))
        .map(|percent| LoanToValue::Finite(percent.round_dp(4)))
        .ok_or(DecimalError::Arithmetic("loan to value"))
}

/// Whether the position can be liquidated under the given collateral factor.
///
/// Compares `debt / collateral > cf / 10000` in exact integer arithmetic.
pub fn is_liquidateable(debt: U256, collateral_value: U256, collateral_factor_bps: u64) -> bool {
    if collateral_value.is_zero() {
        return !debt.is_zero();
    }
    let lhs = debt.saturating_mul(U256::from(BPS_SCALE as u64));
    let rhs = collateral_value.saturating_mul(U256::from(collateral_factor_bps));
    lhs > rhs
}
