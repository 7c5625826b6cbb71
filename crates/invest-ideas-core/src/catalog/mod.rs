pub mod catalog_model;
pub mod catalog_service;
pub mod catalog_store;
pub mod catalog_traits;

pub use catalog_model::{CalculatorKind, IdeaPatch, InvestmentCategory, InvestmentIdea};
pub use catalog_service::{seed_catalog, CatalogService};
pub use catalog_store::{InMemoryStore, JsonFileStore};
pub use catalog_traits::CatalogStore;
