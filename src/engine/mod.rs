//! Pure risk computations: no I/O, deterministic on their inputs.

pub mod liquidation;
pub mod ltv;
pub mod oracle;

pub use liquidation::{
    assess_collateral_factor, assess_liquidation_incentive, max_safe_liquidation_incentive,
    self_liquidation_profitable, BPS_SCALE,
};
pub use ltv::{is_liquidateable, loan_to_value};
pub use oracle::{assess_deviation, assess_unit_price, reference_deviation, unit_price};
