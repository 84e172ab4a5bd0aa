//! Submission retry wrapper
//!
//! Only `submit` is retried. A failed or slow tally is never re-requested,
//! since a second submission would start a second, independent evaluation.

use crate::error::AppError;
use crate::oracle::{OracleClient, OracleRequest, RequestId, TallyResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

pub struct RetryingOracleClient {
    inner: Arc<dyn OracleClient>,
    policy: RetryPolicy,
}

impl RetryingOracleClient {
    pub fn new(inner: Arc<dyn OracleClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl OracleClient for RetryingOracleClient {
    async fn submit(&self, request: &OracleRequest) -> Result<RequestId, AppError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.submit(request).await {
                Ok(id) => return Ok(id),
                Err(e) if attempt < attempts => {
                    warn!(
                        message_id = %request.message_id,
                        attempt,
                        attempts,
                        error = %e,
                        "Oracle submission failed, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn await_result(&self, request_id: &RequestId) -> Result<TallyResult, AppError> {
        self.inner.await_result(request_id).await
    }
}
