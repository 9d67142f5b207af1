//! Command definitions
//!
//! Commands represent intentions to change the catalog; queries read it.
//! Commands carry their own input checks, run by the validation behavior.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::soil_type::check_name_length;
use crate::domain::{DomainError, SoilFormula, SoilFormulaItem, SoilType};
use crate::error::FieldError;
use crate::pipeline::{Request, Validate};

// =========================================================================
// Shared validation rules
// =========================================================================

fn validate_name(errors: &mut Vec<FieldError>, name: &str) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", DomainError::NameEmpty));
    } else if let Err(e) = check_name_length(name) {
        errors.push(FieldError::new("name", e));
    }
}

fn validate_soil_type_id(errors: &mut Vec<FieldError>, field: &str, id: i32) {
    if id <= 0 {
        errors.push(FieldError::new(field, DomainError::InvalidSoilTypeId(id)));
    }
}

fn validate_items(errors: &mut Vec<FieldError>, items: &[SoilFormulaItem]) {
    if items.is_empty() {
        errors.push(FieldError::new("items", DomainError::FormulaEmpty));
        return;
    }

    for (index, item) in items.iter().enumerate() {
        validate_soil_type_id(errors, &format!("items[{}].soil_type_id", index), item.soil_type_id);
        if !(1..=100).contains(&item.percentage) {
            errors.push(FieldError::new(
                format!("items[{}].percentage", index),
                DomainError::InvalidPercentage(item.percentage),
            ));
        }
        if item.order < 0 {
            errors.push(FieldError::new(
                format!("items[{}].order", index),
                DomainError::InvalidOrder(item.order),
            ));
        }
    }
}

// =========================================================================
// Soil type commands and queries
// =========================================================================

/// Command to create a soil type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSoilTypeCommand {
    pub name: String,
}

impl CreateSoilTypeCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Request for CreateSoilTypeCommand {
    type Response = SoilTypeDto;
    const NAME: &'static str = "CreateSoilType";
}

impl Validate for CreateSoilTypeCommand {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_name(&mut errors, &self.name);
        errors
    }
}

/// Command to rename a soil type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSoilTypeCommand {
    pub id: i32,
    pub name: String,
}

impl UpdateSoilTypeCommand {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Request for UpdateSoilTypeCommand {
    type Response = SoilTypeDto;
    const NAME: &'static str = "UpdateSoilType";
}

impl Validate for UpdateSoilTypeCommand {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_soil_type_id(&mut errors, "id", self.id);
        validate_name(&mut errors, &self.name);
        errors
    }
}

/// Command to delete a soil type that no formula uses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSoilTypeCommand {
    pub id: i32,
}

impl Request for DeleteSoilTypeCommand {
    type Response = ();
    const NAME: &'static str = "DeleteSoilType";
}

impl Validate for DeleteSoilTypeCommand {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_soil_type_id(&mut errors, "id", self.id);
        errors
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListSoilTypesQuery;

impl Request for ListSoilTypesQuery {
    type Response = Vec<SoilTypeDto>;
    const NAME: &'static str = "ListSoilTypes";
}

#[derive(Debug, Clone, Copy)]
pub struct GetSoilTypeQuery {
    pub id: i32,
}

impl Request for GetSoilTypeQuery {
    type Response = SoilTypeDto;
    const NAME: &'static str = "GetSoilType";
}

// =========================================================================
// Soil formula commands and queries
// =========================================================================

/// Command to create a soil formula
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSoilFormulaCommand {
    pub name: String,
    pub items: Vec<SoilFormulaItem>,
}

impl CreateSoilFormulaCommand {
    pub fn new(name: impl Into<String>, items: Vec<SoilFormulaItem>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

impl Request for CreateSoilFormulaCommand {
    type Response = SoilFormulaDto;
    const NAME: &'static str = "CreateSoilFormula";
}

impl Validate for CreateSoilFormulaCommand {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_name(&mut errors, &self.name);
        validate_items(&mut errors, &self.items);
        errors
    }
}

/// Command to replace a soil formula's name and items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSoilFormulaCommand {
    pub id: Uuid,
    pub name: String,
    pub items: Vec<SoilFormulaItem>,
}

impl UpdateSoilFormulaCommand {
    pub fn new(id: Uuid, name: impl Into<String>, items: Vec<SoilFormulaItem>) -> Self {
        Self {
            id,
            name: name.into(),
            items,
        }
    }
}

impl Request for UpdateSoilFormulaCommand {
    type Response = SoilFormulaDto;
    const NAME: &'static str = "UpdateSoilFormula";
}

impl Validate for UpdateSoilFormulaCommand {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        validate_name(&mut errors, &self.name);
        validate_items(&mut errors, &self.items);
        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSoilFormulaCommand {
    pub id: Uuid,
}

impl Request for DeleteSoilFormulaCommand {
    type Response = ();
    const NAME: &'static str = "DeleteSoilFormula";
}

impl Validate for DeleteSoilFormulaCommand {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListSoilFormulasQuery;

impl Request for ListSoilFormulasQuery {
    type Response = Vec<SoilFormulaDto>;
    const NAME: &'static str = "ListSoilFormulas";
}

#[derive(Debug, Clone, Copy)]
pub struct GetSoilFormulaQuery {
    pub id: Uuid,
}

impl Request for GetSoilFormulaQuery {
    type Response = SoilFormulaDto;
    const NAME: &'static str = "GetSoilFormula";
}

// =========================================================================
// Results
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilTypeDto {
    pub id: i32,
    pub name: String,
}

impl From<&SoilType> for SoilTypeDto {
    fn from(soil_type: &SoilType) -> Self {
        Self {
            id: soil_type.id(),
            name: soil_type.name().to_string(),
        }
    }
}

/// Formula line with its soil type name resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilFormulaItemDto {
    pub soil_type_id: i32,
    pub soil_type_name: String,
    pub percentage: i32,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilFormulaDto {
    pub id: Uuid,
    pub name: String,
    pub total_percentage: i64,
    pub items: Vec<SoilFormulaItemDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SoilFormulaDto {
    /// Map a formula, taking soil type names from `names`
    pub fn from_formula(formula: &SoilFormula, names: &HashMap<i32, String>) -> Self {
        let items = formula
            .items()
            .iter()
            .map(|line| SoilFormulaItemDto {
                soil_type_id: line.soil_type_id(),
                soil_type_name: names.get(&line.soil_type_id()).cloned().unwrap_or_default(),
                percentage: line.percentage(),
                order: line.order(),
            })
            .collect();

        Self {
            id: formula.id(),
            name: formula.name().to_string(),
            total_percentage: formula.total_percentage(),
            items,
            created_at: formula.created_at(),
            updated_at: formula.updated_at(),
        }
    }
}
