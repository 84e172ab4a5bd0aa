//! Guild to DAO directory
//!
//! Written by the setup flow, read when a proposal is accepted.

use crate::dao::types::DaoBinding;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Thread-safe guild → DAO binding store
pub struct DaoDirectory {
    bindings: RwLock<HashMap<String, Arc<DaoBinding>>>,
}

impl DaoDirectory {
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a guild to a DAO, replacing any previous binding
    pub async fn bind(&self, binding: DaoBinding) -> Arc<DaoBinding> {
        let binding = Arc::new(binding);
        let mut bindings = self.bindings.write().await;
        if let Some(previous) = bindings.insert(binding.guild_id.clone(), binding.clone()) {
            info!(
                guild_id = %binding.guild_id,
                previous = %previous.dao.name,
                current = %binding.dao.name,
                "Guild rebound to a different DAO"
            );
        }
        binding
    }

    /// Look up the DAO bound to a guild
    pub async fn lookup(&self, guild_id: &str) -> Option<Arc<DaoBinding>> {
        let bindings = self.bindings.read().await;
        bindings.get(guild_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.bindings.read().await.len()
    }
}

impl Default for DaoDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::types::sample_entry;
    use std::time::Duration;

    fn binding(guild: &str, dao: &str) -> DaoBinding {
        DaoBinding {
            guild_id: guild.to_string(),
            dao: sample_entry(dao),
            grace_period: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_bind_and_lookup() {
        let directory = DaoDirectory::new();
        assert!(directory.lookup("g1").await.is_none());

        directory.bind(binding("g1", "pizza")).await;
        let found = directory.lookup("g1").await.unwrap();
        assert_eq!(found.dao.name, "pizza");
        assert!(directory.lookup("g2").await.is_none());
    }

    #[tokio::test]
    async fn test_rebind_replaces() {
        let directory = DaoDirectory::new();
        let first = directory.bind(binding("g1", "pizza")).await;
        directory.bind(binding("g1", "pasta")).await;

        assert_eq!(directory.count().await, 1);
        assert_eq!(directory.lookup("g1").await.unwrap().dao.name, "pasta");
        // Bindings handed out earlier are never re-resolved
        assert_eq!(first.dao.name, "pizza");
    }
}
