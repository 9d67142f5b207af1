//! Shared router state

use std::sync::Arc;

use crate::handlers::build_mediator;
use crate::pipeline::Mediator;
use crate::store::{SoilFormulaStore, SoilTypeStore};

#[derive(Debug, Clone)]
pub struct AppState {
    pub mediator: Arc<Mediator>,
}

impl AppState {
    pub fn new(
        soil_types: Arc<dyn SoilTypeStore>,
        soil_formulas: Arc<dyn SoilFormulaStore>,
    ) -> Self {
        Self::from_mediator(build_mediator(soil_types, soil_formulas))
    }

    pub fn from_mediator(mediator: Mediator) -> Self {
        Self {
            mediator: Arc::new(mediator),
        }
    }
}
