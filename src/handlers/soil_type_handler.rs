//! Soil Type Handlers
//!
//! CRUD for soil types. Deletes are refused while a formula still uses the
//! soil type.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::soil_type::normalize_name;
use crate::error::{AppError, AppResult};
use crate::pipeline::Handler;
use crate::store::SoilTypeStore;

use super::{
    CreateSoilTypeCommand, DeleteSoilTypeCommand, GetSoilTypeQuery, ListSoilTypesQuery,
    SoilTypeDto, UpdateSoilTypeCommand,
};

/// Handler for soil type commands and queries
#[derive(Clone)]
pub struct SoilTypeHandler {
    store: Arc<dyn SoilTypeStore>,
}

impl SoilTypeHandler {
    pub fn new(store: Arc<dyn SoilTypeStore>) -> Self {
        Self { store }
    }

    /// Fail if another soil type already holds `name`
    async fn ensure_name_free(&self, name: &str, except: Option<i32>) -> AppResult<()> {
        match self.store.find_soil_type_by_name(name).await? {
            Some(existing) if Some(existing.id()) != except => Err(AppError::Conflict(format!(
                "Soil type '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Handler<ListSoilTypesQuery> for SoilTypeHandler {
    async fn handle(&self, _query: ListSoilTypesQuery) -> AppResult<Vec<SoilTypeDto>> {
        let soil_types = self.store.list_soil_types().await?;
        Ok(soil_types.iter().map(SoilTypeDto::from).collect())
    }
}

#[async_trait]
impl Handler<GetSoilTypeQuery> for SoilTypeHandler {
    async fn handle(&self, query: GetSoilTypeQuery) -> AppResult<SoilTypeDto> {
        let soil_type = self
            .store
            .get_soil_type(query.id)
            .await?
            .ok_or_else(|| AppError::not_found("Soil type", query.id))?;

        Ok(SoilTypeDto::from(&soil_type))
    }
}

#[async_trait]
impl Handler<CreateSoilTypeCommand> for SoilTypeHandler {
    async fn handle(&self, command: CreateSoilTypeCommand) -> AppResult<SoilTypeDto> {
        let name = normalize_name(&command.name)?;
        self.ensure_name_free(&name, None).await?;

        let soil_type = self.store.insert_soil_type(&name).await?;

        tracing::info!(soil_type_id = soil_type.id(), name = %soil_type.name(), "Soil type created");
        Ok(SoilTypeDto::from(&soil_type))
    }
}

#[async_trait]
impl Handler<UpdateSoilTypeCommand> for SoilTypeHandler {
    async fn handle(&self, command: UpdateSoilTypeCommand) -> AppResult<SoilTypeDto> {
        let mut soil_type = self
            .store
            .get_soil_type(command.id)
            .await?
            .ok_or_else(|| AppError::not_found("Soil type", command.id))?;

        soil_type.rename(&command.name)?;
        self.ensure_name_free(soil_type.name(), Some(soil_type.id()))
            .await?;

        if !self.store.update_soil_type(&soil_type).await? {
            return Err(AppError::not_found("Soil type", command.id));
        }

        tracing::info!(soil_type_id = soil_type.id(), name = %soil_type.name(), "Soil type updated");
        Ok(SoilTypeDto::from(&soil_type))
    }
}

#[async_trait]
impl Handler<DeleteSoilTypeCommand> for SoilTypeHandler {
    async fn handle(&self, command: DeleteSoilTypeCommand) -> AppResult<()> {
        if self.store.get_soil_type(command.id).await?.is_none() {
            return Err(AppError::not_found("Soil type", command.id));
        }

        if self.store.is_soil_type_referenced(command.id).await? {
            return Err(AppError::Conflict(format!(
                "Soil type {} is used by at least one formula",
                command.id
            )));
        }

        if !self.store.delete_soil_type(command.id).await? {
            return Err(AppError::not_found("Soil type", command.id));
        }

        tracing::info!(soil_type_id = command.id, "Soil type deleted");
        Ok(())
    }
}
