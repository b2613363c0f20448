pub mod api;
pub mod chain;
pub mod comparator;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod logs;
pub mod price;

pub use chain::{ChainCallError, ChainConnector, ChainReader};
pub use comparator::{AnalysisError, KnownContracts, MarketComparator, MarketRiskService};
pub use config::Config;
pub use domain::{AnalysisReport, Category, Decimal, Finding, Network, Severity};
pub use error::AppError;
pub use logs::{EventLogSource, LogSourceError};
pub use price::{PriceQuote, PriceReference};
