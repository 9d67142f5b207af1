//! PostgreSQL store integration tests
//!
//! Need a migrated database in DATABASE_URL:
//! `cargo test --test integration_store -- --ignored --test-threads=1`

use florarium_api::domain::{SoilFormula, SoilFormulaItem};
use florarium_api::store::{PgStore, SoilFormulaStore, SoilTypeStore, StoreError};

mod common;

#[tokio::test]
#[ignore]
async fn test_soil_type_round_trip() {
    let pool = common::setup_test_db().await;
    let store = PgStore::new(pool);

    let sand = store.insert_soil_type("Sand").await.unwrap();
    let gravel = store.insert_soil_type("Gravel").await.unwrap();

    let names: Vec<String> = store
        .list_soil_types()
        .await
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["Gravel", "Sand"]);

    let found = store.find_soil_type_by_name("Sand").await.unwrap().unwrap();
    assert_eq!(found.id(), sand.id());

    let map = store.soil_type_names(&[sand.id(), gravel.id(), 9999]).await.unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map[&gravel.id()], "Gravel");

    // unique name enforced by the table
    let duplicate = store.insert_soil_type("Sand").await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    assert!(store.delete_soil_type(gravel.id()).await.unwrap());
    assert!(!store.delete_soil_type(gravel.id()).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_soil_formula_round_trip() {
    let pool = common::setup_test_db().await;
    let store = PgStore::new(pool);

    let sand = store.insert_soil_type("Sand").await.unwrap();
    let peat = store.insert_soil_type("Peat").await.unwrap();

    let mut formula = SoilFormula::build(
        "Bog Mix",
        &[
            SoilFormulaItem::new(peat.id(), 70, 0),
            SoilFormulaItem::new(sand.id(), 30, 1),
        ],
    )
    .unwrap();
    store.insert_soil_formula(&formula).await.unwrap();

    let loaded = store.get_soil_formula(formula.id()).await.unwrap().unwrap();
    assert_eq!(loaded.name(), "Bog Mix");
    assert_eq!(loaded.items(), formula.items());
    assert_eq!(loaded.total_percentage(), 100);

    assert!(store.is_soil_type_referenced(sand.id()).await.unwrap());

    // a referenced soil type cannot be removed
    let result = store.delete_soil_type(sand.id()).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    formula
        .rebuild("Bog Mix", &[SoilFormulaItem::new(peat.id(), 100, 0)])
        .unwrap();
    assert!(store.update_soil_formula(&formula).await.unwrap());

    let loaded = store.get_soil_formula(formula.id()).await.unwrap().unwrap();
    assert_eq!(loaded.items().len(), 1);
    assert!(!store.is_soil_type_referenced(sand.id()).await.unwrap());

    assert!(store.delete_soil_formula(formula.id()).await.unwrap());
    assert!(store.get_soil_formula(formula.id()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_formula_name() {
    let pool = common::setup_test_db().await;
    let store = PgStore::new(pool);

    let sand = store.insert_soil_type("Sand").await.unwrap();
    let items = [SoilFormulaItem::new(sand.id(), 50, 0)];

    let first = SoilFormula::build("Mix", &items).unwrap();
    store.insert_soil_formula(&first).await.unwrap();

    let second = SoilFormula::build("Mix", &items).unwrap();
    let result = store.insert_soil_formula(&second).await;
    assert!(matches!(result, Err(StoreError::Conflict(_))));
}

#[tokio::test]
#[ignore]
async fn test_list_order_matches_memory_store() {
    let pool = common::setup_test_db().await;
    let store = PgStore::new(pool);

    store.insert_soil_type("peat").await.unwrap();
    store.insert_soil_type("Sand").await.unwrap();
    store.insert_soil_type("Akadama").await.unwrap();

    let names: Vec<String> = store
        .list_soil_types()
        .await
        .unwrap()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["Akadama", "Sand", "peat"]);
}

#[tokio::test]
#[ignore]
async fn test_timestamps_survive_round_trip() {
    let pool = common::setup_test_db().await;
    let store = PgStore::new(pool);

    let sand = store.insert_soil_type("Sand").await.unwrap();
    let formula = SoilFormula::build("Mix", &[SoilFormulaItem::new(sand.id(), 50, 0)]).unwrap();
    store.insert_soil_formula(&formula).await.unwrap();

    let loaded = store.get_soil_formula(formula.id()).await.unwrap().unwrap();
    assert_eq!(loaded, formula);
}
