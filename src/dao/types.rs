//! DAO registry entry types
//!
//! Mirrors the `RegistryEntry` shape published by the governance subgraph.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"));

/// Returns true for a `0x`-prefixed 20 byte hex address
pub fn is_address(value: &str) -> bool {
    ADDRESS_RE.is_match(value)
}

/// A token amount locked as collateral
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collateral {
    pub token: String,
    pub amount: String,
}

/// Configuration of a DAO's governance queue contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Seconds the queue holds a scheduled container before it can execute
    pub execution_delay: String,
    pub schedule_deposit: Collateral,
    pub challenge_deposit: Collateral,
    pub resolver: String,
    pub rules: String,
}

impl QueueConfig {
    /// The queue's execution delay, if it parses as whole seconds
    pub fn execution_delay(&self) -> Option<Duration> {
        self.execution_delay.trim().parse().ok().map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Queue {
    pub address: String,
    pub config: QueueConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Executor {
    pub address: String,
}

/// A DAO as registered on-chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub name: String,
    pub queue: Queue,
    pub executor: Executor,
}

impl RegistryEntry {
    /// Check that both contract addresses are well formed
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("registry entry has an empty name".to_string());
        }
        if !is_address(&self.queue.address) {
            return Err(format!(
                "DAO '{}' has an invalid queue address '{}'",
                self.name, self.queue.address
            ));
        }
        if !is_address(&self.executor.address) {
            return Err(format!(
                "DAO '{}' has an invalid executor address '{}'",
                self.name, self.executor.address
            ));
        }
        Ok(())
    }
}

/// A guild's connection to a DAO, fixed at setup time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoBinding {
    pub guild_id: String,
    pub dao: RegistryEntry,
    /// Wait between reporting an outcome and executing it
    #[serde(with = "duration_secs")]
    pub grace_period: Duration,
}

impl DaoBinding {
    /// True when the queue's own delay and the relay's grace period disagree
    pub fn has_delay_mismatch(&self) -> bool {
        match self.dao.queue.config.execution_delay() {
            Some(delay) => delay != self.grace_period,
            None => true,
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

#[cfg(test)]
pub(crate) fn sample_entry(name: &str) -> RegistryEntry {
    RegistryEntry {
        name: name.to_string(),
        queue: Queue {
            address: "0x1111111111111111111111111111111111111111".to_string(),
            config: QueueConfig {
                execution_delay: "60".to_string(),
                schedule_deposit: Collateral {
                    token: "0x2222222222222222222222222222222222222222".to_string(),
                    amount: "1000".to_string(),
                },
                challenge_deposit: Collateral {
                    token: "0x2222222222222222222222222222222222222222".to_string(),
                    amount: "2000".to_string(),
                },
                resolver: "0x3333333333333333333333333333333333333333".to_string(),
                rules: "0x".to_string(),
            },
        },
        executor: Executor {
            address: "0x4444444444444444444444444444444444444444".to_string(),
        },
    }
}
