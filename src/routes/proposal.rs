//! Proposal route handlers
//!
//! The chat bridge posts parsed `proposal` commands here and polls the
//! notification outbox for the replies.

use crate::error::{validation_error, ApiResult, AppError};
use crate::models::{CreateProposalRequest, ListProposalsQuery, SuccessResponse};
use crate::pipeline::notify::{messages, Notification};
use crate::pipeline::store::ProposalRecord;
use crate::pipeline::{MessageRef, Notifier};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, warn};
use validator::Validate;

/// Accept a new proposal and schedule its evaluation
pub async fn create_proposal(
    State(state): State<SharedState>,
    Json(payload): Json<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProposalRecord>>)> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let origin = MessageRef {
        guild_id: payload.guild_id.clone().unwrap_or_default(),
        channel_id: payload.channel_id.clone(),
        message_id: payload.message_id.clone(),
    };
    debug!(message_id = %origin.message_id, "Received proposal command");

    let (proposal, dao) = match state.intake.validate_proposal(payload.into()).await {
        Ok(accepted) => accepted,
        Err(e) => {
            // A live proposal's replies belong to its lifecycle only
            if !state.proposals.contains(&origin.message_id).await {
                reply_rejection(&state, &origin, &e).await;
            }
            return Err(e);
        }
    };

    let message = messages::accepted(&proposal);
    let message_id = proposal.message_id().to_string();
    // The lifecycle task runs detached; its outcome lands in the proposal store.
    // A duplicate is answered over HTTP only.
    let _lifecycle = state.orchestrator.accept(proposal, dao).await?;
    let record = state.proposals.get(&message_id).await?;

    info!(message_id = %message_id, "Proposal accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse::with_data(message, record)),
    ))
}

/// List proposals, optionally for one guild
pub async fn list_proposals(
    State(state): State<SharedState>,
    Query(query): Query<ListProposalsQuery>,
) -> ApiResult<Json<SuccessResponse<Vec<ProposalRecord>>>> {
    let records = state.proposals.list(query.guild_id.as_deref()).await;
    Ok(Json(SuccessResponse::with_data(
        format!("Found {} proposals", records.len()),
        records,
    )))
}

/// Get one proposal's lifecycle record
pub async fn get_proposal(
    State(state): State<SharedState>,
    Path(message_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<ProposalRecord>>> {
    let record = state.proposals.get(&message_id).await?;
    Ok(Json(SuccessResponse::with_data(
        format!("Proposal is {:?}", record.stage),
        record,
    )))
}

/// Replies sent for a proposal message
pub async fn list_notifications(
    State(state): State<SharedState>,
    Path(message_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<Vec<Notification>>>> {
    let replies = state.outbox.replies_to(&message_id).await;
    Ok(Json(SuccessResponse::with_data(
        format!("Found {} replies", replies.len()),
        replies,
    )))
}

async fn reply_rejection(state: &SharedState, origin: &MessageRef, err: &AppError) {
    if let Err(e) = state.outbox.reply(origin, &err.user_message()).await {
        warn!(message_id = %origin.message_id, error = %e, "Failed to deliver rejection");
    }
}
