use crate::error::AppError;
use crate::oracle::request::OracleRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the oracle network assigns to an accepted request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyResult {
    pub request_id: RequestId,
    pub payload: Vec<u8>,
    pub resolved_at: DateTime<Utc>,
}

/// The decentralized computation network, treated as a trusted black box.
///
/// `submit` resolves once the network has accepted the request.
/// `await_result` resolves once the witnesses have agreed on a tally; callers
/// bound it with their own timeout.
#[async_trait]
pub trait OracleClient: Send + Sync {
    async fn submit(&self, request: &OracleRequest) -> Result<RequestId, AppError>;

    async fn await_result(&self, request_id: &RequestId) -> Result<TallyResult, AppError>;
}
