//! Proposal lifecycle store
//!
//! One record per accepted proposal. Only the proposal's own orchestration
//! task writes to its record; everything else reads.

use crate::error::AppError;
use crate::pipeline::proposal::Proposal;
use crate::pipeline::state::{LifecycleEvent, Stage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// One applied transition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from: Stage,
    pub to: Stage,
    pub event: LifecycleEvent,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRecord {
    pub proposal: Proposal,
    pub stage: Stage,
    pub request_id: Option<String>,
    pub report_tx: Option<String>,
    pub execution_tx: Option<String>,
    pub failure: Option<String>,
    pub history: Vec<Transition>,
    pub accepted_at: DateTime<Utc>,
}

impl ProposalRecord {
    fn new(proposal: Proposal, accepted_at: DateTime<Utc>) -> Self {
        Self {
            proposal,
            stage: Stage::Scheduled,
            request_id: None,
            report_tx: None,
            execution_tx: None,
            failure: None,
            history: Vec::new(),
            accepted_at,
        }
    }

    /// Apply an event, rejecting transitions the state machine does not allow
    fn apply(&mut self, event: LifecycleEvent, at: DateTime<Utc>) -> Result<Stage, AppError> {
        let from = self.stage;
        let to = from.next(&event).ok_or_else(|| {
            AppError::Internal(format!(
                "proposal {} cannot handle {:?} while {:?}",
                self.proposal.message_id(),
                event,
                from
            ))
        })?;

        match &event {
            LifecycleEvent::RequestAccepted { request_id } => {
                self.request_id = Some(request_id.clone());
            }
            LifecycleEvent::ReportSettled { transaction_hash } => {
                self.report_tx = Some(transaction_hash.clone());
            }
            LifecycleEvent::ExecutionSettled { transaction_hash } => {
                self.execution_tx = Some(transaction_hash.clone());
            }
            LifecycleEvent::SubmissionRejected { reason }
            | LifecycleEvent::TallyFailed { reason }
            | LifecycleEvent::ReportRejected { reason }
            | LifecycleEvent::ExecutionRejected { reason } => {
                self.failure = Some(reason.clone());
            }
            _ => {}
        }

        self.stage = to;
        self.history.push(Transition { from, to, event, at });
        Ok(to)
    }
}

/// Thread-safe proposal record store
pub struct ProposalStore {
    records: RwLock<HashMap<String, ProposalRecord>>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Register a freshly accepted proposal. A message can only be accepted once.
    pub async fn register(
        &self,
        proposal: Proposal,
        accepted_at: DateTime<Utc>,
    ) -> Result<ProposalRecord, AppError> {
        let mut records = self.records.write().await;
        let key = proposal.message_id().to_string();
        if records.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "A proposal for message '{}' has already been accepted",
                key
            )));
        }
        let record = ProposalRecord::new(proposal, accepted_at);
        records.insert(key, record.clone());
        Ok(record)
    }

    /// Apply a lifecycle event to a proposal's record
    pub async fn apply(
        &self,
        message_id: &str,
        event: LifecycleEvent,
        at: DateTime<Utc>,
    ) -> Result<Stage, AppError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(message_id)
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", message_id)))?;
        record.apply(event, at)
    }

    pub async fn get(&self, message_id: &str) -> Result<ProposalRecord, AppError> {
        let records = self.records.read().await;
        records
            .get(message_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Proposal {} not found", message_id)))
    }

    /// List records, optionally only those of one guild, newest first
    pub async fn list(&self, guild_id: Option<&str>) -> Vec<ProposalRecord> {
        let records = self.records.read().await;
        let mut list: Vec<ProposalRecord> = records
            .values()
            .filter(|r| guild_id.map_or(true, |g| r.proposal.origin.guild_id == g))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.accepted_at.cmp(&a.accepted_at));
        list
    }

    /// True once a proposal has been accepted for the message
    pub async fn contains(&self, message_id: &str) -> bool {
        self.records.read().await.contains_key(message_id)
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}
