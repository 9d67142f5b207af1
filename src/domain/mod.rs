//! Domain module
//!
//! Core catalog types and business rules.

pub mod error;
pub mod soil_formula;
pub mod soil_type;
pub mod vocabulary;

pub use error::DomainError;
pub use soil_formula::{SoilFormula, SoilFormulaItem, SoilFormulaLine};
pub use soil_type::{SoilType, MAX_NAME_LENGTH};
pub use vocabulary::{
    DecorationCategory, HumidityLevel, ItemSize, LightLevel, VocabularyEntry, VocabularyKind,
    WaterLevel,
};
