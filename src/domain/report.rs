//! Typed analysis report, one field per report section.

use super::{BorrowerPosition, Decimal, Finding, FindingSummary, ParameterDelta};
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Result of one fault-isolated check.
///
/// A failed check serializes as `{"error": "..."}` in place of its data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    Complete(T),
    Failed { error: String },
}

impl<T> Section<T> {
    pub fn complete(&self) -> Option<&T> {
        match self {
            Section::Complete(data) => Some(data),
            Section::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Complete(_) => None,
            Section::Failed { error } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollateralInfo {
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketInfo {
    pub address: Address,
    pub collateral: CollateralInfo,
    /// Whether the DBR registry lists this market.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbr_allowed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbr_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowControllerInfo {
    pub address: ParameterDelta<Address>,
    pub is_newest: bool,
    pub min_debt: ParameterDelta<Decimal>,
    pub daily_limit: ParameterDelta<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OraclePrice {
    /// Raw oracle answer, as a decimal integer string.
    pub raw: String,
    pub unit_price_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceComparison {
    pub reference_price_usd: Decimal,
    pub deviation_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleInfo {
    pub address: ParameterDelta<Address>,
    pub is_newest: bool,
    pub price: OraclePrice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_comparison: Option<ReferenceComparison>,
}

/// Liquidation parameters, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiquidationInfo {
    pub collateral_factor: ParameterDelta<Decimal>,
    pub liquidation_incentive: ParameterDelta<Decimal>,
    pub liquidation_fee: ParameterDelta<Decimal>,
    /// Absent when the post-change collateral factor is zero.
    pub max_safe_liquidation_incentive: Option<Decimal>,
    pub profitable_self_liquidation_possible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivePositions {
    pub borrow_events_scanned: usize,
    pub active_borrowers: usize,
    pub borrowers: Vec<BorrowerPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub fork_network_id: String,
    pub market: MarketInfo,
    pub borrow_controller: Section<BorrowControllerInfo>,
    pub oracle: Section<OracleInfo>,
    pub liquidation: Section<LiquidationInfo>,
    pub active_positions: Section<ActivePositions>,
    pub summary: FindingSummary,
    pub findings: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_section_serializes_as_error_object() {
        let section: Section<BorrowControllerInfo> = Section::Failed {
            error: "execution reverted".to_string(),
        };
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json, serde_json::json!({"error": "execution reverted"}));
        assert_eq!(section.error(), Some("execution reverted"));
        assert!(section.complete().is_none());
    }

    #[test]
    fn test_complete_section_serializes_inline() {
        let section = Section::Complete(ActivePositions {
            borrow_events_scanned: 3,
            active_borrowers: 1,
            borrowers: vec![],
        });
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["borrow_events_scanned"], 3);
        assert_eq!(json["borrowers"], serde_json::json!([]));
        assert!(!section.is_failed());
    }
}
