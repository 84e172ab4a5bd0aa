//! Guild and registry route handlers

use crate::dao::{DaoBinding, RegistryEntry};
use crate::error::{not_found_error, validation_error, ApiResult};
use crate::intake::setup_message;
use crate::models::{SetupDaoRequest, SuccessResponse};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use validator::Validate;

/// Connect a guild to a registered DAO
pub async fn setup_dao(
    State(state): State<SharedState>,
    Path(guild_id): Path<String>,
    Json(payload): Json<SetupDaoRequest>,
) -> ApiResult<Json<SuccessResponse<DaoBinding>>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;
    info!(guild_id = %guild_id, requester = %payload.requester.id, "Setup requested");

    let binding = state.intake.setup(payload.into_command(guild_id)).await?;
    Ok(Json(SuccessResponse::with_data(
        setup_message(&binding.dao.name),
        (*binding).clone(),
    )))
}

/// The DAO a guild is connected to
pub async fn get_dao(
    State(state): State<SharedState>,
    Path(guild_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<DaoBinding>>> {
    let binding = state
        .directory
        .lookup(&guild_id)
        .await
        .ok_or_else(|| not_found_error(format!("Guild {} is not connected to a DAO", guild_id)))?;
    Ok(Json(SuccessResponse::with_data(
        format!("Connected to DAO \"{}\"", binding.dao.name),
        (*binding).clone(),
    )))
}

/// All DAOs that can be connected
pub async fn list_registry(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<Vec<RegistryEntry>>>> {
    let entries = state.registry.list().await?;
    Ok(Json(SuccessResponse::with_data(
        format!("Found {} registered DAOs", entries.len()),
        entries,
    )))
}
