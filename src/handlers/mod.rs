//! Command Handlers module
//!
//! Commands and queries, their handlers, and the mediator that wires each
//! request type to a pipeline.

mod commands;
mod soil_formula_handler;
mod soil_type_handler;


use std::sync::Arc;

use crate::pipeline::{
    Handler, LoggingBehavior, Mediator, Pipeline, Request, Validate, ValidationBehavior,
};
use crate::store::{SoilFormulaStore, SoilTypeStore};

pub use commands::*;
pub use soil_formula_handler::SoilFormulaHandler;
pub use soil_type_handler::SoilTypeHandler;

/// Commands are logged, then validated
fn command<R: Request + Validate>(handler: impl Handler<R> + 'static) -> Pipeline<R> {
    Pipeline::new(handler)
        .with(LoggingBehavior)
        .with(ValidationBehavior)
}

fn query<R: Request>(handler: impl Handler<R> + 'static) -> Pipeline<R> {
    Pipeline::new(handler).with(LoggingBehavior)
}

/// Register every catalog request against the given stores
pub fn build_mediator(
    soil_types: Arc<dyn SoilTypeStore>,
    soil_formulas: Arc<dyn SoilFormulaStore>,
) -> Mediator {
    let soil_type_handler = SoilTypeHandler::new(soil_types.clone());
    let soil_formula_handler = SoilFormulaHandler::new(soil_types, soil_formulas);

    let mut mediator = Mediator::new();

    mediator.register::<ListSoilTypesQuery>(query(soil_type_handler.clone()));
    mediator.register::<GetSoilTypeQuery>(query(soil_type_handler.clone()));
    mediator.register::<CreateSoilTypeCommand>(command(soil_type_handler.clone()));
    mediator.register::<UpdateSoilTypeCommand>(command(soil_type_handler.clone()));
    mediator.register::<DeleteSoilTypeCommand>(command(soil_type_handler));

    mediator.register::<ListSoilFormulasQuery>(query(soil_formula_handler.clone()));
    mediator.register::<GetSoilFormulaQuery>(query(soil_formula_handler.clone()));
    mediator.register::<CreateSoilFormulaCommand>(command(soil_formula_handler.clone()));
    mediator.register::<UpdateSoilFormulaCommand>(command(soil_formula_handler.clone()));
    mediator.register::<DeleteSoilFormulaCommand>(command(soil_formula_handler));

    mediator
}
