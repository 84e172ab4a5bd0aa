//! DAO registry lookups
//!
//! The registry answers "which DAO is called X". The static implementation is
//! loaded from a JSON export of the subgraph's registry entries.

use crate::config::ConfigError;
use crate::dao::types::RegistryEntry;
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

#[async_trait]
pub trait DaoRegistry: Send + Sync {
    /// Find a registered DAO by its exact name
    async fn find_by_name(&self, name: &str) -> Result<Option<RegistryEntry>, AppError>;

    /// All registered DAOs
    async fn list(&self) -> Result<Vec<RegistryEntry>, AppError>;
}

/// Registry backed by a fixed set of entries
pub struct StaticRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl StaticRegistry {
    pub fn new(entries: Vec<RegistryEntry>) -> Result<Self, AppError> {
        let mut by_name = HashMap::with_capacity(entries.len());
        for entry in entries {
            entry.validate().map_err(ConfigError::InvalidValue)?;
            if by_name.contains_key(&entry.name) {
                return Err(ConfigError::InvalidValue(format!(
                    "DAO '{}' is registered twice",
                    entry.name
                ))
                .into());
            }
            by_name.insert(entry.name.clone(), entry);
        }
        Ok(Self { entries: by_name })
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Parse a JSON array of registry entries
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let entries: Vec<RegistryEntry> = serde_json::from_str(raw)
            .map_err(|e| ConfigError::ParseError(format!("Invalid registry JSON: {}", e)))?;
        Self::new(entries)
    }

    /// Load the registry from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidValue(format!(
                "Cannot read registry file {}: {}",
                path.display(),
                e
            ))
        })?;
        let registry = Self::from_json(&raw)?;
        info!(
            "Loaded {} DAO registry entries from {}",
            registry.entries.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Load from an optional path, falling back to an empty registry
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                warn!("REGISTRY_PATH not set, no DAO can be connected until it is configured");
                Ok(Self::empty())
            }
        }
    }
}

#[async_trait]
impl DaoRegistry for StaticRegistry {
    async fn find_by_name(&self, name: &str) -> Result<Option<RegistryEntry>, AppError> {
        Ok(self.entries.get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<RegistryEntry>, AppError> {
        let mut entries: Vec<RegistryEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
