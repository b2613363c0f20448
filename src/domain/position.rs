use super::{Decimal, ParameterDelta};
use alloy_primitives::Address;
use serde::{Serialize, Serializer};

/// Loan-to-value as a percentage.
///
/// Zero collateral backing a positive debt has no finite ratio and is kept
/// as its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanToValue {
    Finite(Decimal),
    Infinite,
}

impl LoanToValue {
    pub fn is_infinite(&self) -> bool {
        matches!(self, LoanToValue::Infinite)
    }
}

impl Serialize for LoanToValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LoanToValue::Finite(percent) => percent.serialize(serializer),
            LoanToValue::Infinite => serializer.serialize_str("infinity"),
        }
    }
}

/// A borrower whose position is affected by the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowerPosition {
    pub address: Address,
    pub debt: Decimal,
    pub collateral_value: ParameterDelta<Decimal>,
    pub credit_limit: ParameterDelta<Decimal>,
    pub loan_to_value: ParameterDelta<LoanToValue>,
    pub liquidateable: bool,
}
