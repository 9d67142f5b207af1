//! Soil Formula Handlers
//!
//! Builds formulas through the domain aggregate, checks that every
//! referenced soil type exists, persists, and returns DTOs enriched with
//! soil type names.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::SoilFormula;
use crate::error::{AppError, AppResult};
use crate::pipeline::Handler;
use crate::store::{SoilFormulaStore, SoilTypeStore};

use super::{
    CreateSoilFormulaCommand, DeleteSoilFormulaCommand, GetSoilFormulaQuery,
    ListSoilFormulasQuery, SoilFormulaDto, UpdateSoilFormulaCommand,
};

/// Handler for soil formula commands and queries
#[derive(Clone)]
pub struct SoilFormulaHandler {
    soil_types: Arc<dyn SoilTypeStore>,
    soil_formulas: Arc<dyn SoilFormulaStore>,
}

impl SoilFormulaHandler {
    pub fn new(
        soil_types: Arc<dyn SoilTypeStore>,
        soil_formulas: Arc<dyn SoilFormulaStore>,
    ) -> Self {
        Self {
            soil_types,
            soil_formulas,
        }
    }

    /// Names of every soil type the formula uses; unknown ids are an error
    async fn resolve_soil_types(&self, formula: &SoilFormula) -> AppResult<HashMap<i32, String>> {
        let ids = formula.soil_type_ids();
        let names = self.soil_types.soil_type_names(&ids).await?;

        if let Some(missing) = ids.iter().find(|id| !names.contains_key(*id)) {
            return Err(AppError::not_found("Soil type", missing));
        }
        Ok(names)
    }

    async fn ensure_name_free(&self, formula: &SoilFormula) -> AppResult<()> {
        match self
            .soil_formulas
            .find_soil_formula_by_name(formula.name())
            .await?
        {
            Some(existing) if existing.id() != formula.id() => Err(AppError::Conflict(format!(
                "Soil formula '{}' already exists",
                formula.name()
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Handler<ListSoilFormulasQuery> for SoilFormulaHandler {
    async fn handle(&self, _query: ListSoilFormulasQuery) -> AppResult<Vec<SoilFormulaDto>> {
        let formulas = self.soil_formulas.list_soil_formulas().await?;

        let mut ids: Vec<i32> = formulas.iter().flat_map(|f| f.soil_type_ids()).collect();
        ids.sort_unstable();
        ids.dedup();
        let names = self.soil_types.soil_type_names(&ids).await?;

        Ok(formulas
            .iter()
            .map(|formula| SoilFormulaDto::from_formula(formula, &names))
            .collect())
    }
}

#[async_trait]
impl Handler<GetSoilFormulaQuery> for SoilFormulaHandler {
    async fn handle(&self, query: GetSoilFormulaQuery) -> AppResult<SoilFormulaDto> {
        let formula = self
            .soil_formulas
            .get_soil_formula(query.id)
            .await?
            .ok_or_else(|| AppError::not_found("Soil formula", query.id))?;

        let names = self.soil_types.soil_type_names(&formula.soil_type_ids()).await?;
        Ok(SoilFormulaDto::from_formula(&formula, &names))
    }
}

#[async_trait]
impl Handler<CreateSoilFormulaCommand> for SoilFormulaHandler {
    async fn handle(&self, command: CreateSoilFormulaCommand) -> AppResult<SoilFormulaDto> {
        let formula = SoilFormula::build(&command.name, &command.items)?;

        let names = self.resolve_soil_types(&formula).await?;
        self.ensure_name_free(&formula).await?;

        self.soil_formulas.insert_soil_formula(&formula).await?;

        tracing::info!(
            formula_id = %formula.id(),
            name = %formula.name(),
            items = formula.items().len(),
            total_percentage = formula.total_percentage(),
            "Soil formula created"
        );
        Ok(SoilFormulaDto::from_formula(&formula, &names))
    }
}

#[async_trait]
impl Handler<UpdateSoilFormulaCommand> for SoilFormulaHandler {
    async fn handle(&self, command: UpdateSoilFormulaCommand) -> AppResult<SoilFormulaDto> {
        let mut formula = self
            .soil_formulas
            .get_soil_formula(command.id)
            .await?
            .ok_or_else(|| AppError::not_found("Soil formula", command.id))?;

        formula.rebuild(&command.name, &command.items)?;

        let names = self.resolve_soil_types(&formula).await?;
        self.ensure_name_free(&formula).await?;

        if !self.soil_formulas.update_soil_formula(&formula).await? {
            return Err(AppError::not_found("Soil formula", command.id));
        }

        tracing::info!(
            formula_id = %formula.id(),
            name = %formula.name(),
            items = formula.items().len(),
            total_percentage = formula.total_percentage(),
            "Soil formula updated"
        );
        Ok(SoilFormulaDto::from_formula(&formula, &names))
    }
}

#[async_trait]
impl Handler<DeleteSoilFormulaCommand> for SoilFormulaHandler {
    async fn handle(&self, command: DeleteSoilFormulaCommand) -> AppResult<()> {
        if !self.soil_formulas.delete_soil_formula(command.id).await? {
            return Err(AppError::not_found("Soil formula", command.id));
        }

        tracing::info!(formula_id = %command.id, "Soil formula deleted");
        Ok(())
    }
}
