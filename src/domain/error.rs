//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business rule violations for catalog entities.
///
/// The first block is owned by the aggregates themselves; the per-item
/// variants are raised by command validation before a formula is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Name is blank after trimming
    #[error("Name must not be empty")]
    NameEmpty,

    /// Name exceeds the storage limit
    #[error("Name must be at most {max} characters (got {actual})")]
    NameTooLong { max: usize, actual: usize },

    /// Formula has no items
    #[error("Formula must contain at least one item")]
    FormulaEmpty,

    /// Aggregated percentages exceed 100
    #[error("Percentages must be between 1 and 100 and sum to 100 (total {total})")]
    PercentageInvalid { total: i64 },

    #[error("Soil type id must be a positive integer (got {0})")]
    InvalidSoilTypeId(i32),

    #[error("Percentage must be between 1 and 100 (got {0})")]
    InvalidPercentage(i32),

    #[error("Order must not be negative (got {0})")]
    InvalidOrder(i32),
}

impl DomainError {
    /// Stable machine-readable code used in error responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::NameEmpty => "name_empty",
            Self::NameTooLong { .. } => "name_too_long",
            Self::FormulaEmpty => "formula_empty",
            Self::PercentageInvalid { .. } => "percentage_invalid",
            Self::InvalidSoilTypeId(_) => "invalid_soil_type_id",
            Self::InvalidPercentage(_) => "invalid_percentage",
            Self::InvalidOrder(_) => "invalid_order",
        }
    }
}
