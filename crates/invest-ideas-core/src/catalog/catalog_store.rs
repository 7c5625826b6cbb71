use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::catalog::catalog_model::InvestmentCategory;
use crate::catalog::catalog_traits::CatalogStore;
use crate::error::InvestIdeasError;
use crate::InvestIdeasResult;

/// Catalog kept as one pretty-printed JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CatalogStore for JsonFileStore {
    fn read_snapshot(&self) -> InvestIdeasResult<Vec<InvestmentCategory>> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            InvestIdeasError::Storage(format!("reading {}: {e}", self.path.display()))
        })?;
        let categories: Vec<InvestmentCategory> = serde_json::from_str(&contents)?;
        debug!(
            "read {} categories from {}",
            categories.len(),
            self.path.display()
        );
        Ok(categories)
    }

    /// Write to a sibling temp file, then rename over the target so readers
    /// never see a half-written document.
    fn write_snapshot(&self, categories: &[InvestmentCategory]) -> InvestIdeasResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut json = serde_json::to_string_pretty(categories)?;
        json.push('\n');

        let tmp = self.temp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            InvestIdeasError::Storage(format!("replacing {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}

/// Catalog held in process memory; used by tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    categories: RwLock<Vec<InvestmentCategory>>,
}

impl InMemoryStore {
    pub fn new(categories: Vec<InvestmentCategory>) -> Self {
        InMemoryStore {
            categories: RwLock::new(categories),
        }
    }
}

impl CatalogStore for InMemoryStore {
    fn read_snapshot(&self) -> InvestIdeasResult<Vec<InvestmentCategory>> {
        self.categories
            .read()
            .map(|c| c.clone())
            .map_err(|_| InvestIdeasError::Storage("catalog lock poisoned".into()))
    }

    fn write_snapshot(&self, categories: &[InvestmentCategory]) -> InvestIdeasResult<()> {
        let mut guard = self
            .categories
            .write()
            .map_err(|_| InvestIdeasError::Storage("catalog lock poisoned".into()))?;
        *guard = categories.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        let store = JsonFileStore::new("data/investments.json");
        assert_eq!(store.temp_path(), PathBuf::from("data/investments.json.tmp"));
    }

    #[test]
    fn test_in_memory_round_trip() {
        let store = InMemoryStore::default();
        assert!(store.read_snapshot().unwrap().is_empty());
        let cats = vec![InvestmentCategory {
            id: "c".into(),
            title: "C".into(),
            ideas: vec![],
        }];
        store.write_snapshot(&cats).unwrap();
        assert_eq!(store.read_snapshot().unwrap(), cats);
    }
}
