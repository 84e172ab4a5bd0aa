//! Proposal lifecycle state machine
//!
//! ```text
//! Scheduled -> RequestBuilt -> RequestSubmitted -> TallyPending -> Reported
//!                   |                                  |    |           |
//!                   v                                  v    v           v
//!            SubmissionFailed                TallyFailed  ReportFailed  ExecutionPending
//!                                                                        |          |
//!                                                                        v          v
//!                                                                  Executed  ExecutionFailed
//! ```
//!
//! Transitions are pure; the orchestrator feeds events in as each
//! suspension point settles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Scheduled,
    RequestBuilt,
    RequestSubmitted,
    TallyPending,
    Reported,
    ExecutionPending,
    Executed,
    SubmissionFailed,
    TallyFailed,
    ReportFailed,
    ExecutionFailed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Stage::Executed
                | Stage::SubmissionFailed
                | Stage::TallyFailed
                | Stage::ReportFailed
                | Stage::ExecutionFailed
        )
    }

    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != Stage::Executed
    }

    /// Stage reached by applying `event`, or `None` if the event is not
    /// valid in this stage
    pub fn next(self, event: &LifecycleEvent) -> Option<Stage> {
        use LifecycleEvent as E;

        let next = match (self, event) {
            (Stage::Scheduled, E::DeadlineReached) => Stage::RequestBuilt,
            (Stage::RequestBuilt, E::RequestAccepted { .. }) => Stage::RequestSubmitted,
            (Stage::RequestBuilt, E::SubmissionRejected { .. }) => Stage::SubmissionFailed,
            (Stage::RequestSubmitted, E::AwaitingTally) => Stage::TallyPending,
            (Stage::TallyPending, E::TallyFailed { .. }) => Stage::TallyFailed,
            (Stage::TallyPending, E::ReportSettled { .. }) => Stage::Reported,
            (Stage::TallyPending, E::ReportRejected { .. }) => Stage::ReportFailed,
            (Stage::Reported, E::GraceElapsed) => Stage::ExecutionPending,
            (Stage::ExecutionPending, E::ExecutionSettled { .. }) => Stage::Executed,
            (Stage::ExecutionPending, E::ExecutionRejected { .. }) => Stage::ExecutionFailed,
            _ => return None,
        };
        Some(next)
    }
}

/// Something that happened to a proposal while it was in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    DeadlineReached,
    #[serde(rename_all = "camelCase")]
    RequestAccepted { request_id: String },
    SubmissionRejected { reason: String },
    AwaitingTally,
    TallyFailed { reason: String },
    #[serde(rename_all = "camelCase")]
    ReportSettled { transaction_hash: String },
    ReportRejected { reason: String },
    GraceElapsed,
    #[serde(rename_all = "camelCase")]
    ExecutionSettled { transaction_hash: String },
    ExecutionRejected { reason: String },
}
