//! Replies at the origin of a proposal
//!
//! Delivery is fire-and-forget: callers log a failed reply and move on.

use crate::error::AppError;
use crate::pipeline::proposal::{MessageRef, Proposal};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Reply at the location of the given chat message
    async fn reply(&self, origin: &MessageRef, text: &str) -> Result<(), AppError>;
}

/// A reply that has been handed to the chat transport
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub channel_id: String,
    pub message_id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Keeps every reply in memory, keyed by the message it answers.
/// The chat bridge drains it through the HTTP API.
pub struct OutboxNotifier {
    replies: RwLock<HashMap<String, Vec<Notification>>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self {
            replies: RwLock::new(HashMap::new()),
        }
    }

    /// Replies sent for a message, oldest first
    pub async fn replies_to(&self, message_id: &str) -> Vec<Notification> {
        let replies = self.replies.read().await;
        replies.get(message_id).cloned().unwrap_or_default()
    }
}

impl Default for OutboxNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn reply(&self, origin: &MessageRef, text: &str) -> Result<(), AppError> {
        if origin.channel_id.trim().is_empty() || origin.message_id.trim().is_empty() {
            return Err(AppError::Notification(format!(
                "no channel to reply in for message '{}'",
                origin.message_id
            )));
        }
        info!(channel_id = %origin.channel_id, message_id = %origin.message_id, "[BOT]: {}", text);
        let notification = Notification {
            id: Uuid::new_v4(),
            channel_id: origin.channel_id.clone(),
            message_id: origin.message_id.clone(),
            text: text.to_string(),
            sent_at: Utc::now(),
        };
        self.replies
            .write()
            .await
            .entry(origin.message_id.clone())
            .or_default()
            .push(notification);
        Ok(())
    }
}

/// User-facing reply texts
pub mod messages {
    use super::Proposal;

    pub fn accepted(proposal: &Proposal) -> String {
        format!(
            "Received a request for creating a proposal with message_id='{}' and deadline={}",
            proposal.message_id(),
            proposal.deadline.to_rfc2822()
        )
    }

    pub fn reported(request_id: &str, tx_hash: &str) -> String {
        format!(
            "The ID of the data request ({}) has been reported to the Ethereum contract ({})",
            request_id, tx_hash
        )
    }

    pub fn report_failed() -> String {
        "There was an error reporting the proposal result".to_string()
    }

    pub fn executed(tx_url: &str) -> String {
        format!("The proposal has been executed in Ethereum transaction: {}", tx_url)
    }

    pub fn execution_failed() -> String {
        "There was an error executing the proposal".to_string()
    }

    pub fn tally_failed(request_id: &str) -> String {
        format!(
            "The oracle network did not resolve the data request ({}); \
             the proposal was not reported",
            request_id
        )
    }
}
