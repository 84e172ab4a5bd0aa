//! Local oracle network
//!
//! In-process stand-in for the witness network. Request ids are the SHA-256
//! digest of the request body and tallies resolve after a fixed latency.
//! A request is forgotten once its tally has been handed out.

use crate::clock::Clock;
use crate::error::AppError;
use crate::oracle::{OracleClient, OracleRequest, RequestId, TallyResult};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

pub struct LocalOracleNetwork {
    latency: Duration,
    clock: Arc<dyn Clock>,
    requests: RwLock<HashMap<RequestId, OracleRequest>>,
}

impl LocalOracleNetwork {
    pub fn new(latency: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            latency,
            clock,
            requests: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl OracleClient for LocalOracleNetwork {
    async fn submit(&self, request: &OracleRequest) -> Result<RequestId, AppError> {
        if request.retrieve.is_empty() {
            return Err(AppError::Oracle(
                "data request has no retrieval sources".to_string(),
            ));
        }
        let id = RequestId(request.digest());
        self.requests.write().await.insert(id.clone(), request.clone());
        debug!(request_id = %id, "Local oracle accepted data request");
        Ok(id)
    }

    async fn await_result(&self, request_id: &RequestId) -> Result<TallyResult, AppError> {
        let request = self
            .requests
            .read()
            .await
            .get(request_id)
            .cloned()
            .ok_or_else(|| AppError::Oracle(format!("unknown data request {}", request_id)))?;

        tokio::time::sleep(self.latency).await;
        self.requests.write().await.remove(request_id);

        let mut hasher = Sha256::new();
        hasher.update(request_id.0.as_bytes());
        for source in &request.retrieve {
            hasher.update(source.url.as_bytes());
        }
        Ok(TallyResult {
            request_id: request_id.clone(),
            payload: hasher.finalize().to_vec(),
            resolved_at: self.clock.now(),
        })
    }
}
