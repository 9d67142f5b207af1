//! Soil Type
//!
//! A named raw material (sand, gravel, bark...) that formulas reference by id.

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Maximum length of catalog names (column size)
pub const MAX_NAME_LENGTH: usize = 255;

/// Trim a catalog name and reject it when nothing is left.
pub fn normalize_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::NameEmpty);
    }
    Ok(trimmed.to_string())
}

/// Check a raw name against the length limit, counted in characters.
pub fn check_name_length(name: &str) -> Result<(), DomainError> {
    let actual = name.trim().chars().count();
    if actual > MAX_NAME_LENGTH {
        return Err(DomainError::NameTooLong {
            max: MAX_NAME_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Soil type entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilType {
    id: i32,
    name: String,
}

impl SoilType {
    /// Create a soil type with a storage-assigned id
    pub fn new(id: i32, name: &str) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: normalize_name(name)?,
        })
    }

    /// Reassemble a soil type loaded from storage
    pub(crate) fn restore(id: i32, name: String) -> Self {
        Self { id, name }
    }

    /// Replace the name. Leaves the entity untouched on failure.
    pub fn rename(&mut self, name: &str) -> Result<(), DomainError> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
