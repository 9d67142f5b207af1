//! florarium_api Library
//!
//! Terrarium catalog backend: soil types, soil formulas and the fixed
//! vocabularies shared by the rest of the catalog.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod store;

pub use config::{Config, LogFormat};
pub use domain::{DomainError, SoilFormula, SoilFormulaItem, SoilType};
pub use error::{AppError, AppResult, FieldError};
pub use pipeline::Mediator;
