//! Store module
//!
//! Storage abstraction for the catalog. Handlers only see the traits;
//! `postgres` backs the server and `memory` backs tests.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{SoilFormula, SoilType};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur in a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique or reference constraint rejected the write
    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// Soil type persistence
#[async_trait]
pub trait SoilTypeStore: Send + Sync {
    /// All soil types ordered by name
    async fn list_soil_types(&self) -> Result<Vec<SoilType>, StoreError>;

    async fn get_soil_type(&self, id: i32) -> Result<Option<SoilType>, StoreError>;

    async fn find_soil_type_by_name(&self, name: &str) -> Result<Option<SoilType>, StoreError>;

    /// Insert a new soil type; the store assigns the id
    async fn insert_soil_type(&self, name: &str) -> Result<SoilType, StoreError>;

    /// Returns false when the soil type does not exist
    async fn update_soil_type(&self, soil_type: &SoilType) -> Result<bool, StoreError>;

    /// Returns false when the soil type does not exist
    async fn delete_soil_type(&self, id: i32) -> Result<bool, StoreError>;

    /// Whether any formula line references the soil type
    async fn is_soil_type_referenced(&self, id: i32) -> Result<bool, StoreError>;

    /// Names of the given soil types; unknown ids are absent from the map
    async fn soil_type_names(&self, ids: &[i32]) -> Result<HashMap<i32, String>, StoreError>;
}

/// Soil formula persistence. Formulas are written whole: row plus lines.
#[async_trait]
pub trait SoilFormulaStore: Send + Sync {
    /// All formulas ordered by name
    async fn list_soil_formulas(&self) -> Result<Vec<SoilFormula>, StoreError>;

    async fn get_soil_formula(&self, id: Uuid) -> Result<Option<SoilFormula>, StoreError>;

    async fn find_soil_formula_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SoilFormula>, StoreError>;

    async fn insert_soil_formula(&self, formula: &SoilFormula) -> Result<(), StoreError>;

    /// Replace name and lines; returns false when the formula does not exist
    async fn update_soil_formula(&self, formula: &SoilFormula) -> Result<bool, StoreError>;

    /// Returns false when the formula does not exist
    async fn delete_soil_formula(&self, id: Uuid) -> Result<bool, StoreError>;
}
