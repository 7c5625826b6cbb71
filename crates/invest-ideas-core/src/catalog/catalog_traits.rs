use crate::catalog::catalog_model::InvestmentCategory;
use crate::InvestIdeasResult;

/// Whole-snapshot persistence for the idea catalog.
pub trait CatalogStore: Send + Sync {
    fn read_snapshot(&self) -> InvestIdeasResult<Vec<InvestmentCategory>>;
    fn write_snapshot(&self, categories: &[InvestmentCategory]) -> InvestIdeasResult<()>;
}
