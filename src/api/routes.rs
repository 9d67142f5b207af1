//! API Routes
//!
//! HTTP endpoint definitions. Every catalog endpoint turns its input into a
//! command or query and sends it through the mediator.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{SoilFormulaItem, VocabularyEntry, VocabularyKind};
use crate::error::{AppError, AppResult};
use crate::handlers::{
    CreateSoilFormulaCommand, CreateSoilTypeCommand, DeleteSoilFormulaCommand,
    DeleteSoilTypeCommand, GetSoilFormulaQuery, GetSoilTypeQuery, ListSoilFormulasQuery,
    ListSoilTypesQuery, SoilFormulaDto, SoilTypeDto, UpdateSoilFormulaCommand,
    UpdateSoilTypeCommand,
};

use super::state::AppState;

// =========================================================================
// Request types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSoilTypeRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSoilTypeRequest {
    pub name: String,
}

/// Body for both creating and replacing a soil formula
#[derive(Debug, Deserialize)]
pub struct SoilFormulaRequest {
    pub name: String,
    #[serde(default)]
    pub items: Vec<SoilFormulaItem>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/soil-types", get(list_soil_types).post(create_soil_type))
        .route(
            "/soil-types/:id",
            get(get_soil_type)
                .put(update_soil_type)
                .delete(delete_soil_type),
        )
        .route(
            "/soil-formulas",
            get(list_soil_formulas).post(create_soil_formula),
        )
        .route(
            "/soil-formulas/:id",
            get(get_soil_formula)
                .put(update_soil_formula)
                .delete(delete_soil_formula),
        )
        .route("/vocabularies/:kind", get(list_vocabulary))
        .route("/vocabularies/:kind/:code", get(get_vocabulary_entry))
}

/// Unwrap an extractor, turning its rejection into a 400 with our error body
fn extracted<T, E: std::fmt::Display>(input: Result<T, E>) -> AppResult<T> {
    input.map_err(|e| AppError::InvalidRequest(e.to_string()))
}

// =========================================================================
// Soil types
// =========================================================================

async fn list_soil_types(State(state): State<AppState>) -> AppResult<Json<Vec<SoilTypeDto>>> {
    let soil_types = state.mediator.send(ListSoilTypesQuery).await?;
    Ok(Json(soil_types))
}

async fn create_soil_type(
    State(state): State<AppState>,
    payload: Result<Json<CreateSoilTypeRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SoilTypeDto>)> {
    let Json(request) = extracted(payload)?;

    let soil_type = state
        .mediator
        .send(CreateSoilTypeCommand::new(request.name))
        .await?;

    Ok((StatusCode::CREATED, Json(soil_type)))
}

async fn get_soil_type(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<SoilTypeDto>> {
    let Path(id) = extracted(id)?;
    let soil_type = state.mediator.send(GetSoilTypeQuery { id }).await?;
    Ok(Json(soil_type))
}

async fn update_soil_type(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateSoilTypeRequest>, JsonRejection>,
) -> AppResult<Json<SoilTypeDto>> {
    let Path(id) = extracted(id)?;
    let Json(request) = extracted(payload)?;

    let soil_type = state
        .mediator
        .send(UpdateSoilTypeCommand::new(id, request.name))
        .await?;

    Ok(Json(soil_type))
}

async fn delete_soil_type(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = extracted(id)?;
    state.mediator.send(DeleteSoilTypeCommand { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Soil formulas
// =========================================================================

async fn list_soil_formulas(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<SoilFormulaDto>>> {
    let formulas = state.mediator.send(ListSoilFormulasQuery).await?;
    Ok(Json(formulas))
}

async fn create_soil_formula(
    State(state): State<AppState>,
    payload: Result<Json<SoilFormulaRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SoilFormulaDto>)> {
    let Json(request) = extracted(payload)?;

    let formula = state
        .mediator
        .send(CreateSoilFormulaCommand::new(request.name, request.items))
        .await?;

    Ok((StatusCode::CREATED, Json(formula)))
}

async fn get_soil_formula(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<SoilFormulaDto>> {
    let Path(id) = extracted(id)?;
    let formula = state.mediator.send(GetSoilFormulaQuery { id }).await?;
    Ok(Json(formula))
}

async fn update_soil_formula(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SoilFormulaRequest>, JsonRejection>,
) -> AppResult<Json<SoilFormulaDto>> {
    let Path(id) = extracted(id)?;
    let Json(request) = extracted(payload)?;

    let formula = state
        .mediator
        .send(UpdateSoilFormulaCommand::new(id, request.name, request.items))
        .await?;

    Ok(Json(formula))
}

async fn delete_soil_formula(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = extracted(id)?;
    state.mediator.send(DeleteSoilFormulaCommand { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Vocabularies
// =========================================================================

fn vocabulary_kind(kind: &str) -> AppResult<VocabularyKind> {
    kind.parse::<VocabularyKind>()
        .map_err(|_| AppError::not_found("Vocabulary", kind))
}

async fn list_vocabulary(
    kind: Result<Path<String>, PathRejection>,
) -> AppResult<Json<Vec<VocabularyEntry>>> {
    let Path(kind) = extracted(kind)?;
    let kind = vocabulary_kind(&kind)?;
    Ok(Json(kind.entries()))
}

async fn get_vocabulary_entry(
    path: Result<Path<(String, i32)>, PathRejection>,
) -> AppResult<Json<VocabularyEntry>> {
    let Path((kind, code)) = extracted(path)?;
    let kind = vocabulary_kind(&kind)?;

    kind.lookup(code)
        .map(Json)
        .ok_or_else(|| AppError::not_found("Vocabulary entry", format!("{}/{}", kind, code)))
}
