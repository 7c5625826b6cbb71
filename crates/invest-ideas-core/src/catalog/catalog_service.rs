use log::info;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::catalog_model::{IdeaPatch, InvestmentCategory, InvestmentIdea};
use crate::catalog::catalog_traits::CatalogStore;
use crate::error::InvestIdeasError;
use crate::InvestIdeasResult;

const SEED_CATALOG: &str = include_str!("../../data/investments.json");

/// The catalogue shipped with the showcase.
pub fn seed_catalog() -> InvestIdeasResult<Vec<InvestmentCategory>> {
    let categories: Vec<InvestmentCategory> = serde_json::from_str(SEED_CATALOG)?;
    validate_catalog(&categories)?;
    Ok(categories)
}

/// Category ids unique, idea ids unique, and every idea filed under the
/// category it names.
pub fn validate_catalog(categories: &[InvestmentCategory]) -> InvestIdeasResult<()> {
    let mut category_ids = HashSet::new();
    let mut idea_ids = HashSet::new();
    for category in categories {
        if !category_ids.insert(category.id.as_str()) {
            return Err(InvestIdeasError::invalid(
                "categories",
                format!("Duplicate category id '{}'", category.id),
            ));
        }
        for idea in &category.ideas {
            if !idea_ids.insert(idea.id.as_str()) {
                return Err(InvestIdeasError::invalid(
                    "ideas",
                    format!("Duplicate idea id '{}'", idea.id),
                ));
            }
            if idea.category != category.id {
                return Err(InvestIdeasError::invalid(
                    "ideas",
                    format!(
                        "Idea '{}' names category '{}' but is filed under '{}'",
                        idea.id, idea.category, category.id
                    ),
                ));
            }
        }
    }
    Ok(())
}

pub struct CatalogService<S: CatalogStore> {
    store: Arc<S>,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        CatalogService { store }
    }

    pub fn list_categories(&self) -> InvestIdeasResult<Vec<InvestmentCategory>> {
        self.store.read_snapshot()
    }

    pub fn find_idea(&self, category_id: &str, idea_id: &str) -> InvestIdeasResult<InvestmentIdea> {
        let categories = self.store.read_snapshot()?;
        let category = find_category(&categories, category_id)?;
        category
            .ideas
            .iter()
            .find(|i| i.id == idea_id)
            .cloned()
            .ok_or_else(|| idea_not_found(idea_id))
    }

    /// Look an idea up by id alone, across every category.
    pub fn locate_idea(&self, idea_id: &str) -> InvestIdeasResult<InvestmentIdea> {
        self.store
            .read_snapshot()?
            .into_iter()
            .flat_map(|c| c.ideas)
            .find(|i| i.id == idea_id)
            .ok_or_else(|| idea_not_found(idea_id))
    }

    /// Merge `patch` into the idea and persist the whole snapshot.
    pub fn update_idea(
        &self,
        category_id: &str,
        idea_id: &str,
        patch: IdeaPatch,
    ) -> InvestIdeasResult<InvestmentIdea> {
        let mut categories = self.store.read_snapshot()?;
        let category_index = categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or_else(|| category_not_found(category_id))?;
        let idea = categories[category_index]
            .ideas
            .iter_mut()
            .find(|i| i.id == idea_id)
            .ok_or_else(|| idea_not_found(idea_id))?;

        patch.apply(idea);
        let updated = idea.clone();

        self.store.write_snapshot(&categories)?;
        info!("updated idea {category_id}/{idea_id}");
        Ok(updated)
    }

    /// Replace the stored catalogue with the built-in one.
    pub fn reset_to_seed(&self) -> InvestIdeasResult<Vec<InvestmentCategory>> {
        let seed = seed_catalog()?;
        self.store.write_snapshot(&seed)?;
        info!("catalog reset to {} seed categories", seed.len());
        Ok(seed)
    }
}

fn find_category<'a>(
    categories: &'a [InvestmentCategory],
    category_id: &str,
) -> InvestIdeasResult<&'a InvestmentCategory> {
    categories
        .iter()
        .find(|c| c.id == category_id)
        .ok_or_else(|| category_not_found(category_id))
}

fn category_not_found(id: &str) -> InvestIdeasError {
    InvestIdeasError::NotFound {
        entity: "category".into(),
        id: id.to_string(),
    }
}

fn idea_not_found(id: &str) -> InvestIdeasError {
    InvestIdeasError::NotFound {
        entity: "idea".into(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog_model::CalculatorKind;
    use crate::catalog::catalog_store::InMemoryStore;

    fn service() -> CatalogService<InMemoryStore> {
        CatalogService::new(Arc::new(InMemoryStore::new(seed_catalog().unwrap())))
    }

    #[test]
    fn test_seed_catalog_shape() {
        let seed = seed_catalog().unwrap();
        let ids: Vec<&str> = seed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["propietats", "productes-financers", "industria"]);
        assert_eq!(seed[0].ideas.len(), 4);
    }

    #[test]
    fn test_find_idea_with_calculator() {
        let idea = service().find_idea("propietats", "inversio-catalunya").unwrap();
        assert_eq!(idea.calculator, Some(CalculatorKind::RentalProperty));
        assert_eq!(idea.investment, "€300.000");
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let svc = service();
        let before = svc.find_idea("productes-financers", "etf-msci-world").unwrap();
        let patch = IdeaPatch {
            annual_return: Some("6-8%".into()),
            ..Default::default()
        };
        let after = svc
            .update_idea("productes-financers", "etf-msci-world", patch)
            .unwrap();
        assert_eq!(after.annual_return, "6-8%");
        assert_eq!(after.title, before.title);
        assert_eq!(after.pros, before.pros);
        assert_eq!(svc.locate_idea("etf-msci-world").unwrap(), after);
    }

    #[test]
    fn test_update_unknown_category_or_idea() {
        let svc = service();
        assert!(matches!(
            svc.update_idea("nope", "etf-msci-world", IdeaPatch::default()),
            Err(InvestIdeasError::NotFound { ref entity, .. }) if entity == "category"
        ));
        assert!(matches!(
            svc.update_idea("industria", "etf-msci-world", IdeaPatch::default()),
            Err(InvestIdeasError::NotFound { ref entity, .. }) if entity == "idea"
        ));
    }

    #[test]
    fn test_duplicate_idea_ids_rejected() {
        let mut seed = seed_catalog().unwrap();
        let dup = seed[0].ideas[0].clone();
        seed[0].ideas.push(dup);
        assert!(validate_catalog(&seed).is_err());
    }
}
