//! In-memory Store
//!
//! Mirrors the PostgreSQL constraints (unique names, restricted soil type
//! deletes) so handlers behave the same against either store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{SoilFormula, SoilType};

use super::{SoilFormulaStore, SoilTypeStore, StoreError};

#[derive(Debug, Default)]
struct State {
    next_soil_type_id: i32,
    soil_types: BTreeMap<i32, String>,
    formulas: HashMap<Uuid, SoilFormula>,
}

impl State {
    fn soil_type_name_taken(&self, name: &str, except: Option<i32>) -> bool {
        self.soil_types
            .iter()
            .any(|(id, existing)| existing == name && Some(*id) != except)
    }

    fn formula_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.formulas
            .values()
            .any(|formula| formula.name() == name && Some(formula.id()) != except)
    }

    fn check_references(&self, formula: &SoilFormula) -> Result<(), StoreError> {
        match formula
            .soil_type_ids()
            .into_iter()
            .find(|id| !self.soil_types.contains_key(id))
        {
            Some(missing) => Err(StoreError::Conflict(format!(
                "soil type {} does not exist",
                missing
            ))),
            None => Ok(()),
        }
    }
}

/// In-memory store for soil types and formulas.
///
/// Lists sort names by byte order, the same as `COLLATE "C"` in [`super::PgStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SoilTypeStore for MemoryStore {
    async fn list_soil_types(&self) -> Result<Vec<SoilType>, StoreError> {
        let state = self.state.read().await;
        let mut soil_types: Vec<SoilType> = state
            .soil_types
            .iter()
            .map(|(id, name)| SoilType::restore(*id, name.clone()))
            .collect();
        soil_types.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(soil_types)
    }

    async fn get_soil_type(&self, id: i32) -> Result<Option<SoilType>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .soil_types
            .get(&id)
            .map(|name| SoilType::restore(id, name.clone())))
    }

    async fn find_soil_type_by_name(&self, name: &str) -> Result<Option<SoilType>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .soil_types
            .iter()
            .find(|(_, existing)| existing.as_str() == name)
            .map(|(id, existing)| SoilType::restore(*id, existing.clone())))
    }

    async fn insert_soil_type(&self, name: &str) -> Result<SoilType, StoreError> {
        let mut state = self.state.write().await;
        if state.soil_type_name_taken(name, None) {
            return Err(StoreError::Conflict(format!(
                "soil type name '{}' already exists",
                name
            )));
        }

        state.next_soil_type_id += 1;
        let id = state.next_soil_type_id;
        state.soil_types.insert(id, name.to_string());

        Ok(SoilType::restore(id, name.to_string()))
    }

    async fn update_soil_type(&self, soil_type: &SoilType) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.soil_types.contains_key(&soil_type.id()) {
            return Ok(false);
        }
        if state.soil_type_name_taken(soil_type.name(), Some(soil_type.id())) {
            return Err(StoreError::Conflict(format!(
                "soil type name '{}' already exists",
                soil_type.name()
            )));
        }

        state
            .soil_types
            .insert(soil_type.id(), soil_type.name().to_string());
        Ok(true)
    }

    async fn delete_soil_type(&self, id: i32) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let referenced = state
            .formulas
            .values()
            .any(|formula| formula.items().iter().any(|line| line.soil_type_id() == id));
        if referenced {
            return Err(StoreError::Conflict(format!(
                "soil type {} is used by a formula",
                id
            )));
        }

        Ok(state.soil_types.remove(&id).is_some())
    }

    async fn is_soil_type_referenced(&self, id: i32) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .formulas
            .values()
            .any(|formula| formula.items().iter().any(|line| line.soil_type_id() == id)))
    }

    async fn soil_type_names(&self, ids: &[i32]) -> Result<HashMap<i32, String>, StoreError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.soil_types.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}

#[async_trait]
impl SoilFormulaStore for MemoryStore {
    async fn list_soil_formulas(&self) -> Result<Vec<SoilFormula>, StoreError> {
        let state = self.state.read().await;
        let mut formulas: Vec<SoilFormula> = state.formulas.values().cloned().collect();
        formulas.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(formulas)
    }

    async fn get_soil_formula(&self, id: Uuid) -> Result<Option<SoilFormula>, StoreError> {
        let state = self.state.read().await;
        Ok(state.formulas.get(&id).cloned())
    }

    async fn find_soil_formula_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SoilFormula>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .formulas
            .values()
            .find(|formula| formula.name() == name)
            .cloned())
    }

    async fn insert_soil_formula(&self, formula: &SoilFormula) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.formulas.contains_key(&formula.id())
            || state.formula_name_taken(formula.name(), None)
        {
            return Err(StoreError::Conflict(format!(
                "soil formula name '{}' already exists",
                formula.name()
            )));
        }
        state.check_references(formula)?;

        state.formulas.insert(formula.id(), formula.clone());
        Ok(())
    }

    async fn update_soil_formula(&self, formula: &SoilFormula) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.formulas.contains_key(&formula.id()) {
            return Ok(false);
        }
        if state.formula_name_taken(formula.name(), Some(formula.id())) {
            return Err(StoreError::Conflict(format!(
                "soil formula name '{}' already exists",
                formula.name()
            )));
        }
        state.check_references(formula)?;

        state.formulas.insert(formula.id(), formula.clone());
        Ok(true)
    }

    async fn delete_soil_formula(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.formulas.remove(&id).is_some())
    }
}
