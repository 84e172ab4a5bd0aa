//! Proposal records
//!
//! A proposal is created once when a chat command is accepted and never
//! changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of the chat message a proposal was raised in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub guild_id: String,
    pub channel_id: String,
    pub message_id: String,
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.guild_id, self.channel_id, self.message_id)
    }
}

/// A governance vote under evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    #[serde(flatten)]
    pub origin: MessageRef,
    pub description: String,
    /// Evaluation may begin once this instant has passed
    #[serde(with = "chrono::serde::ts_seconds")]
    pub deadline: DateTime<Utc>,
    /// Name of the DAO resolved at submission time
    pub dao_name: String,
    pub created_at: DateTime<Utc>,
}

impl Proposal {
    pub fn new(
        origin: MessageRef,
        description: impl Into<String>,
        deadline: DateTime<Utc>,
        dao_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            origin,
            description: description.into(),
            deadline,
            dao_name: dao_name.into(),
            created_at,
        }
    }

    pub fn message_id(&self) -> &str {
        &self.origin.message_id
    }
}

#[cfg(test)]
pub(crate) fn sample_proposal(message_id: &str, deadline: DateTime<Utc>) -> Proposal {
    Proposal::new(
        MessageRef {
            guild_id: "guild-1".to_string(),
            channel_id: "channel-1".to_string(),
            message_id: message_id.to_string(),
        },
        "Buy more pizza for the hackathon",
        deadline,
        "pizza",
        deadline - chrono::Duration::seconds(1000),
    )
}
