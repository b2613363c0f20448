//! Domain types for the market risk report.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: Network, ParameterDelta, address resolution
//! - Findings and the typed AnalysisReport

pub mod decimal;
pub mod finding;
pub mod position;
pub mod primitives;
pub mod report;

pub use decimal::{Decimal, DecimalError};
pub use finding::{Assessment, Category, Finding, FindingSummary, Findings, Severity};
pub use position::{BorrowerPosition, LoanToValue};
pub use primitives::{resolve_checksum_address, InvalidAddressError, Network, ParameterDelta};
pub use report::{
    ActivePositions, AnalysisReport, BorrowControllerInfo, CollateralInfo, LiquidationInfo,
    MarketInfo, OracleInfo, OraclePrice, ReferenceComparison, Section,
};
