//! Core business logic abstractions

pub mod asset;
pub mod cache;
pub mod config;
pub mod log;
pub mod oracle;
pub mod transaction;
pub mod valuation;

// Re-export main types for cleaner imports
pub use asset::AssetClass;
pub use oracle::{PriceOracle, QuoteSnapshot};
pub use transaction::Transaction;
pub use valuation::{PortfolioSummary, ValuationResult, ValuationWarning, valuate};
