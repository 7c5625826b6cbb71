#![cfg(feature = "catalog")]

use std::sync::Arc;

use invest_ideas_core::catalog::{
    seed_catalog, CatalogService, CatalogStore, IdeaPatch, JsonFileStore,
};
use invest_ideas_core::InvestIdeasError;
use pretty_assertions::assert_eq;

fn seeded_file_store(dir: &tempfile::TempDir) -> JsonFileStore {
    let store = JsonFileStore::new(dir.path().join("data").join("investments.json"));
    store.write_snapshot(&seed_catalog().unwrap()).unwrap();
    store
}

#[test]
fn test_file_store_round_trips_seed() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_file_store(&dir);
    assert_eq!(store.read_snapshot().unwrap(), seed_catalog().unwrap());
    assert!(!dir.path().join("data").join("investments.json.tmp").exists());
}

#[test]
fn test_update_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(seeded_file_store(&dir));
    let service = CatalogService::new(store.clone());

    let patch: IdeaPatch = serde_json::from_str(
        r#"{ "title": "Hotel Pousada Sol e Lua (renovat)", "cons": [] }"#,
    )
    .unwrap();
    service
        .update_idea("propietats", "hotel-pousada", patch)
        .unwrap();

    let reopened = CatalogService::new(Arc::new(JsonFileStore::new(store.path())));
    let idea = reopened.find_idea("propietats", "hotel-pousada").unwrap();
    assert_eq!(idea.title, "Hotel Pousada Sol e Lua (renovat)");
    assert!(idea.cons.is_empty());
    assert_eq!(idea.investment, "€850.000");
}

#[test]
fn test_missing_file_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    assert!(matches!(
        store.read_snapshot(),
        Err(InvestIdeasError::Storage(_))
    ));
}

#[test]
fn test_corrupt_file_is_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("investments.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStore::new(&path);
    assert!(matches!(
        store.read_snapshot(),
        Err(InvestIdeasError::SerializationError(_))
    ));
}

#[test]
fn test_stored_json_uses_camel_case() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_file_store(&dir);
    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"annualReturn\""));
    assert!(!raw.contains("\"annual_return\""));
}
