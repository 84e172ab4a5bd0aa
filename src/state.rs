//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::chain::LocalGovernChain;
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::dao::{DaoDirectory, DaoRegistry, StaticRegistry};
use crate::error::AppError;
use crate::intake::Intake;
use crate::oracle::{LocalOracleNetwork, OracleClient, RetryPolicy, RetryingOracleClient};
use crate::pipeline::{Collaborators, Notifier, OutboxNotifier, ProposalOrchestrator, ProposalStore};
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Guild → DAO bindings, written by setup
    pub directory: Arc<DaoDirectory>,

    /// Registered DAOs
    pub registry: Arc<dyn DaoRegistry>,

    /// Command validation
    pub intake: Intake,

    /// Proposal lifecycle driver
    pub orchestrator: Arc<ProposalOrchestrator>,

    /// Lifecycle records of every accepted proposal
    pub proposals: Arc<ProposalStore>,

    /// Replies waiting to be picked up by the chat bridge
    pub outbox: Arc<OutboxNotifier>,
}

impl AppState {
    /// Wire up the local oracle network and governance chain
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let registry = StaticRegistry::load(settings.registry_path.as_deref())?;
        Ok(Self::with_registry(settings, Arc::new(registry)))
    }

    pub fn with_registry(settings: &Settings, registry: Arc<dyn DaoRegistry>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let network: Arc<dyn OracleClient> = Arc::new(LocalOracleNetwork::new(
            settings.oracle.resolution_latency,
            clock.clone(),
        ));
        let oracle: Arc<dyn OracleClient> = Arc::new(RetryingOracleClient::new(
            network,
            RetryPolicy {
                max_attempts: settings.oracle.submit_attempts,
                backoff: settings.oracle.retry_backoff,
            },
        ));
        let chain = Arc::new(LocalGovernChain::new(clock.clone()));
        let outbox = Arc::new(OutboxNotifier::new());
        let notifier: Arc<dyn Notifier> = outbox.clone();

        let directory = Arc::new(DaoDirectory::new());
        let proposals = Arc::new(ProposalStore::new());
        let orchestrator = Arc::new(ProposalOrchestrator::new(
            Collaborators {
                oracle,
                reporter: chain.clone(),
                executor: chain,
                notifier,
                clock: clock.clone(),
            },
            proposals.clone(),
            settings,
        ));
        let intake = Intake::new(
            directory.clone(),
            registry.clone(),
            clock,
            settings.pipeline.default_grace_period,
        );

        Self {
            directory,
            registry,
            intake,
            orchestrator,
            proposals,
            outbox,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
