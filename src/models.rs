//! Data models and DTOs (Data Transfer Objects)
//!
//! Contains all request/response structures used by the API.

use crate::intake::{NewProposal, SetupCommand};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Generic success response
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Request to open a proposal for a chat message
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    /// Absent when the command was sent as a direct message
    pub guild_id: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Channel id is required"))]
    pub channel_id: String,
    #[validate(length(min = 1, max = 64, message = "Message id is required"))]
    pub message_id: String,
    #[validate(length(max = 2000, message = "Proposal description is too long"))]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
}

impl From<CreateProposalRequest> for NewProposal {
    fn from(req: CreateProposalRequest) -> Self {
        NewProposal {
            guild_id: req.guild_id,
            channel_id: req.channel_id,
            message_id: req.message_id,
            description: req.description,
            deadline: req.deadline,
        }
    }
}

/// Who issued a command
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub id: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Request to connect a guild to a DAO
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetupDaoRequest {
    #[validate(length(max = 128, message = "DAO name is too long"))]
    pub dao_name: Option<String>,
    pub requester: Requester,
    #[validate(range(
        min = 1,
        max = 2_592_000,
        message = "Grace period must be between 1 second and 30 days"
    ))]
    pub grace_period_secs: Option<u64>,
}

impl SetupDaoRequest {
    pub fn into_command(self, guild_id: String) -> SetupCommand {
        SetupCommand {
            guild_id: Some(guild_id),
            dao_name: self.dao_name,
            requester_permissions: self.requester.permissions,
            grace_period: self.grace_period_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProposalsQuery {
    pub guild_id: Option<String>,
}
