pub mod cagr;
pub mod cashflow;
pub mod cost;
pub mod error;
pub mod financing;
pub mod growth;
pub mod tables;
pub mod types;
pub mod valuation;

#[cfg(feature = "real_estate")]
pub mod real_estate;

#[cfg(feature = "financial_products")]
pub mod financial_products;

#[cfg(feature = "hospitality")]
pub mod hospitality;

#[cfg(feature = "backtest")]
pub mod backtest;

#[cfg(feature = "catalog")]
pub mod catalog;

pub use error::InvestIdeasError;
pub use types::*;

/// Standard result type for all invest-ideas operations
pub type InvestIdeasResult<T> = Result<T, InvestIdeasError>;
