//! Local governance chain
//!
//! Keeps scheduled containers in memory and hands out deterministic
//! transaction hashes. A data request can be scheduled once per queue, and
//! each scheduled container can be executed once.

use crate::chain::{OutcomeExecutor, OutcomeReporter, Report, TxHash};
use crate::clock::Clock;
use crate::dao::RegistryEntry;
use crate::error::AppError;
use crate::oracle::RequestId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Container scheduled on a DAO's queue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Container {
    queue: String,
    executor: String,
    request_id: String,
    execution_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerState {
    Scheduled,
    Executed,
}

/// Containers are keyed by queue address and data request id
type ContainerKey = (String, String);

#[derive(Debug)]
struct ScheduledContainer {
    payload: Vec<u8>,
    state: ContainerState,
}

pub struct LocalGovernChain {
    clock: Arc<dyn Clock>,
    containers: RwLock<HashMap<ContainerKey, ScheduledContainer>>,
    nonce: AtomicU64,
}

impl LocalGovernChain {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            containers: RwLock::new(HashMap::new()),
            nonce: AtomicU64::new(0),
        }
    }

    fn next_tx_hash(&self, parts: &[&[u8]]) -> TxHash {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed) + 1;

        let mut hasher = Sha256::new();
        hasher.update(nonce.to_be_bytes());
        for part in parts {
            hasher.update(part);
        }
        let hex: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
        TxHash(format!("0x{}", hex))
    }
}

#[async_trait]
impl OutcomeReporter for LocalGovernChain {
    async fn report(
        &self,
        dao: &RegistryEntry,
        request_id: &RequestId,
        execution_delay: Duration,
    ) -> Result<Report, AppError> {
        let delay = chrono::Duration::from_std(execution_delay)
            .map_err(|e| AppError::Chain(format!("execution delay out of range: {}", e)))?;
        let container = Container {
            queue: dao.queue.address.clone(),
            executor: dao.executor.address.clone(),
            request_id: request_id.0.clone(),
            execution_time: self.clock.now() + delay,
        };
        let payload = serde_json::to_vec(&container)
            .map_err(|e| AppError::Chain(format!("cannot encode container: {}", e)))?;

        let key = (container.queue.clone(), container.request_id.clone());
        {
            let mut containers = self.containers.write().await;
            if containers.contains_key(&key) {
                return Err(AppError::Chain(format!(
                    "data request {} is already scheduled on {}",
                    request_id, dao.queue.address
                )));
            }
            containers.insert(
                key,
                ScheduledContainer {
                    payload: payload.clone(),
                    state: ContainerState::Scheduled,
                },
            );
        }

        let transaction_hash =
            self.next_tx_hash(&[dao.queue.address.as_bytes(), payload.as_slice()]);
        info!(dao = %dao.name, tx = %transaction_hash, "Scheduled container on local queue");
        Ok(Report {
            transaction_hash,
            payload,
        })
    }
}

#[async_trait]
impl OutcomeExecutor for LocalGovernChain {
    async fn execute(&self, dao: &RegistryEntry, payload: &[u8]) -> Result<TxHash, AppError> {
        let container: Container = serde_json::from_slice(payload)
            .map_err(|e| AppError::Chain(format!("malformed container: {}", e)))?;
        if container.queue != dao.queue.address {
            return Err(AppError::Chain(format!(
                "container belongs to queue {}, not {}",
                container.queue, dao.queue.address
            )));
        }

        let key = (container.queue, container.request_id);
        {
            let mut containers = self.containers.write().await;
            let scheduled = containers
                .get_mut(&key)
                .filter(|c| c.payload == payload)
                .ok_or_else(|| AppError::Chain("container was never scheduled".to_string()))?;
            if scheduled.state == ContainerState::Executed {
                return Err(AppError::Chain("container was already executed".to_string()));
            }
            scheduled.state = ContainerState::Executed;
        }

        let tx = self.next_tx_hash(&[dao.executor.address.as_bytes(), payload]);
        info!(dao = %dao.name, tx = %tx, "Executed container on local queue");
        Ok(tx)
    }
}
