//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Converts fixed-point chain integers (wei-scaled amounts, basis points) into
//! human-scale values without going through floating point.

use alloy_primitives::U256;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest mantissa rust_decimal can hold (2^96 - 1).
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// Largest scale rust_decimal supports.
const MAX_SCALE: u32 = 28;

/// Decimals used by the protocol's USD-denominated amounts.
pub const WAD_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("value {0} is too large to represent as a decimal")]
    Overflow(String),
    #[error("arithmetic overflow computing {0}")]
    Arithmetic(&'static str),
    #[error("not a finite number: {0}")]
    NotFinite(String),
}

/// Lossless decimal numeric type for financial calculations.
///
/// Serializes to a JSON number (not string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Scale a raw on-chain integer down by `10^decimals`.
    ///
    /// Trailing digits are truncated when the value has more significant
    /// digits than rust_decimal can carry. Fails with `Overflow` once the
    /// scaled integer part exceeds 96 bits (raw values around `7.9e28 * 10^decimals`).
    pub fn from_units(raw: U256, decimals: u32) -> Result<Self, DecimalError> {
        let mut raw = raw;
        let mut scale = decimals;
        let ten = U256::from(10u8);

        while scale > MAX_SCALE {
            raw /= ten;
            scale -= 1;
        }

        loop {
            match u128::try_from(raw) {
                Ok(mantissa) if mantissa <= MAX_MANTISSA => {
                    let value = RustDecimal::try_from_i128_with_scale(mantissa as i128, scale)
                        .map_err(|_| DecimalError::Overflow(raw.to_string()))?;
                    return Ok(Decimal(value.normalize()));
                }
                _ if scale > 0 => {
                    raw /= ten;
                    scale -= 1;
                }
                _ => return Err(DecimalError::Overflow(raw.to_string())),
            }
        }
    }

    /// Scale an 18-decimal amount to whole units.
    pub fn from_wad(raw: U256) -> Result<Self, DecimalError> {
        Self::from_units(raw, WAD_DECIMALS)
    }

    /// Like `from_wad`, but amounts past the decimal range (for example a
    /// `type(uint256).max` "unlimited" sentinel) clamp to `Decimal::MAX`.
    pub fn from_wad_saturating(raw: U256) -> Self {
        Self::from_wad(raw).unwrap_or(Decimal(RustDecimal::MAX))
    }

    /// Basis points as a percentage (8000 bps -> 80).
    pub fn percent_from_bps(bps: i128) -> Self {
        let value = RustDecimal::try_from_i128_with_scale(bps, 2).unwrap_or(RustDecimal::MAX);
        Decimal(value.normalize())
    }

    /// Convert a floating point quote (e.g. from a JSON API) into a Decimal.
    pub fn try_from_f64(value: f64) -> Result<Self, DecimalError> {
        RustDecimal::try_from(value)
            .map(Decimal)
            .map_err(|_| DecimalError::NotFinite(value.to_string()))
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn one() -> Self {
        Decimal(RustDecimal::ONE)
    }

    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    pub fn checked_sub(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    pub fn checked_mul(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    pub fn checked_div(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Round to `dp` decimal places for display.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(self.0.round_dp(dp).normalize())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(whole: u64) -> U256 {
        U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_from_wad_whole_amount() {
        let value = Decimal::from_wad(wad(1500)).unwrap();
        assert_eq!(value.to_canonical_string(), "1500");
    }

    #[test]
    fn test_from_wad_fractional_amount() {
        let raw = U256::from(1_250_000_000_000_000_000u128);
        assert_eq!(Decimal::from_wad(raw).unwrap().to_canonical_string(), "1.25");
    }

    #[test]
    fn test_from_units_truncates_beyond_mantissa() {
        // 10^40 wei-scaled: more significant digits than 96 bits can hold.
        let raw = U256::from(10u64).pow(U256::from(40u64)) + U256::from(7u64);
        let value = Decimal::from_wad(raw).unwrap();
        assert_eq!(value.to_canonical_string(), "10000000000000000000000");
    }

    #[test]
    fn test_from_units_overflow() {
        let err = Decimal::from_units(U256::MAX, 0).unwrap_err();
        assert!(matches!(err, DecimalError::Overflow(_)));
    }

    #[test]
    fn test_from_wad_saturating() {
        assert_eq!(
            Decimal::from_wad_saturating(wad(1500)).to_canonical_string(),
            "1500"
        );
        assert_eq!(Decimal::from_wad_saturating(U256::MAX).inner(), RustDecimal::MAX);
        assert!(Decimal::from_wad(U256::MAX).is_err());
    }

    #[test]
    fn test_percent_from_bps() {
        assert_eq!(Decimal::percent_from_bps(8000).to_canonical_string(), "80");
        assert_eq!(Decimal::percent_from_bps(1250).to_canonical_string(), "12.5");
        assert_eq!(Decimal::percent_from_bps(0).to_canonical_string(), "0");
    }

    #[test]
    fn test_decimal_json_serialization() {
        let decimal = Decimal::from_str_canonical("123.456").unwrap();
        let json = serde_json::to_value(decimal).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }

    #[test]
    fn test_try_from_f64() {
        let value = Decimal::try_from_f64(1.5).unwrap();
        assert_eq!(value.to_canonical_string(), "1.5");
        assert!(Decimal::try_from_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Decimal::from_str_canonical("10").unwrap();
        let b = Decimal::from_str_canonical("4").unwrap();
        assert_eq!(a.checked_div(b).unwrap().to_canonical_string(), "2.5");
        assert_eq!(a.checked_sub(b).unwrap().to_canonical_string(), "6");
        assert!(a.checked_div(Decimal::zero()).is_none());
    }
}
