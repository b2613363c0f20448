//! Oracle unit price and reference deviation.

use crate::domain::{Assessment, Decimal, DecimalError};
use alloy_primitives::U256;
use rust_decimal::Decimal as RustDecimal;

/// 0.01 USD in 1e18 fixed point.
const MIN_UNIT_PRICE: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// Relative deviation from the reference price that is flagged.
pub const MAX_REFERENCE_DEVIATION: RustDecimal = RustDecimal::from_parts(1, 0, 0, false, 1);

fn pow10(exp: u64) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}

fn wad() -> U256 {
    U256::from(1_000_000_000_000_000_000u64)
}

fn max_unit_price() -> U256 {
    U256::from(10_000u64) * wad()
}

/// Price of one whole collateral token, 1e18-scaled:
/// `10^decimals * price / 10^18` with integer division.
pub fn unit_price(decimals: u8, oracle_price: U256) -> Result<U256, DecimalError> {
    pow10(decimals as u64)
        .and_then(|unit| unit.checked_mul(oracle_price))
        .map(|scaled| scaled / wad())
        .ok_or(DecimalError::Arithmetic("collateral unit price"))
}

pub fn assess_unit_price(unit_price: U256) -> Option<Assessment> {
    if unit_price.is_zero() {
        Some(Assessment::error("Oracle price is 0"))
    } else if unit_price < MIN_UNIT_PRICE {
        Some(Assessment::warning("Unit price is less than $0.01"))
    } else if unit_price > max_unit_price() {
        Some(Assessment::warning("Unit price is above $10,000"))
    } else {
        None
    }
}

/// Relative deviation `unit / reference - 1`. `None` for a non-positive reference.
pub fn reference_deviation(unit_price_usd: Decimal, reference_usd: Decimal) -> Option<Decimal> {
    if !reference_usd.is_positive() {
        return None;
    }
    unit_price_usd
        .checked_div(reference_usd)
        .and_then(|ratio| ratio.checked_sub(Decimal::one()))
}

pub fn assess_deviation(deviation: Decimal) -> Option<Assessment> {
    if deviation.abs().inner() > MAX_REFERENCE_DEVIATION {
        let percent = deviation
            .checked_mul(Decimal::hundred())
            .unwrap_or(deviation)
            .inner()
            .round_dp(2);
        Some(Assessment::warning(format!(
            "Oracle price deviates by {:.2}% from Coingecko",
            percent
        )))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    fn usd(value: &str) -> Decimal {
        Decimal::from_str_canonical(value).unwrap()
    }

    #[test]
    fn test_unit_price_scales_by_token_decimals() {
        // 6-decimal token: oracle answers per smallest unit, scaled by 1e30.
        let price = pow10(30).unwrap();
        let unit = unit_price(6, price).unwrap();
        assert_eq!(unit, wad());

        // 18-decimal token priced at 2500 USD.
        let price = U256::from(2500u64) * wad();
        assert_eq!(unit_price(18, price).unwrap(), U256::from(2500u64) * wad());
    }

    #[test]
    fn test_unit_price_overflow() {
        assert!(unit_price(60, U256::MAX).is_err());
    }

    #[test]
    fn test_unit_price_levels() {
        assert_eq!(assess_unit_price(U256::ZERO).unwrap().severity, Severity::Error);
        assert_eq!(
            assess_unit_price(MIN_UNIT_PRICE - U256::from(1u64)).unwrap().severity,
            Severity::Warning
        );
        assert!(assess_unit_price(MIN_UNIT_PRICE).is_none());
        assert!(assess_unit_price(max_unit_price()).is_none());
        assert_eq!(
            assess_unit_price(max_unit_price() + U256::from(1u64)).unwrap().message,
            "Unit price is above $10,000"
        );
    }

    #[test]
    fn test_reference_deviation() {
        let dev = reference_deviation(usd("1.05"), usd("1")).unwrap();
        assert_eq!(dev, usd("0.05"));
        assert!(assess_deviation(dev).is_none());

        let dev = reference_deviation(usd("0.85"), usd("1")).unwrap();
        let assessment = assess_deviation(dev).unwrap();
        assert_eq!(assessment.severity, Severity::Warning);
        assert_eq!(assessment.message, "Oracle price deviates by -15.00% from Coingecko");
    }

    #[test]
    fn test_deviation_exactly_ten_percent_not_flagged() {
        let dev = reference_deviation(usd("1.1"), usd("1")).unwrap();
        assert!(assess_deviation(dev).is_none());
    }

    #[test]
    fn test_reference_deviation_requires_positive_reference() {
        assert!(reference_deviation(usd("1"), Decimal::zero()).is_none());
    }
}
