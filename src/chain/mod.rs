//! Governance chain module
//!
//! Reporting a tallied data request to a DAO's queue, and executing the
//! container the queue scheduled for it.

mod local;

pub use local::LocalGovernChain;

use crate::dao::RegistryEntry;
use crate::error::AppError;
use crate::oracle::RequestId;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Hash of a submitted Ethereum transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receipt of a reported outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub transaction_hash: TxHash,
    /// Opaque container handed to the executor
    pub payload: Vec<u8>,
}

#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    /// Report the tallied request to the DAO's queue. Any error means no receipt.
    async fn report(
        &self,
        dao: &RegistryEntry,
        request_id: &RequestId,
        execution_delay: Duration,
    ) -> Result<Report, AppError>;
}

#[async_trait]
pub trait OutcomeExecutor: Send + Sync {
    /// Execute a previously reported container. Any error means no transaction.
    async fn execute(&self, dao: &RegistryEntry, payload: &[u8]) -> Result<TxHash, AppError>;
}
