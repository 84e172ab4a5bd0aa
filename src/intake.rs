//! Command intake
//!
//! Validates proposal and setup commands before anything is scheduled.
//! Every rejection carries the text shown to the user.

use crate::clock::Clock;
use crate::dao::{DaoBinding, DaoDirectory, DaoRegistry};
use crate::error::{validation_error, AppError};
use crate::pipeline::{MessageRef, Proposal};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const ADMIN_PERMISSION: &str = "ADMINISTRATOR";

const DIRECT_MESSAGE: &str =
    "Sorry, this method can't be used in direct messaging. Please use it in a channel.";
const UNBOUND_GUILD: &str = "Sorry, this server isn't connected yet to any DAO. \
     Please connect it to a DAO using the setup command.";
const MISSING_DESCRIPTION: &str =
    "The proposal should include a description of what is being voted.";
const PAST_DEADLINE: &str = "The entered deadline for the voting period is already past. \
     Please try again with a future date and time.";
const MISSING_DAO_NAME: &str = "The setup command should include the name of your DAO.";
const NOT_ADMIN: &str =
    "Sorry, only users with Admin permission are allowed to setup this integration.";

/// A parsed `proposal` command
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub message_id: String,
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
}

/// A parsed `setup` command
#[derive(Debug, Clone)]
pub struct SetupCommand {
    pub guild_id: Option<String>,
    pub dao_name: Option<String>,
    pub requester_permissions: Vec<String>,
    pub grace_period: Option<Duration>,
}

pub struct Intake {
    directory: Arc<DaoDirectory>,
    registry: Arc<dyn DaoRegistry>,
    clock: Arc<dyn Clock>,
    default_grace_period: Duration,
}

impl Intake {
    pub fn new(
        directory: Arc<DaoDirectory>,
        registry: Arc<dyn DaoRegistry>,
        clock: Arc<dyn Clock>,
        default_grace_period: Duration,
    ) -> Self {
        Self {
            directory,
            registry,
            clock,
            default_grace_period,
        }
    }

    /// Check a proposal command and resolve the DAO it belongs to
    pub async fn validate_proposal(
        &self,
        command: NewProposal,
    ) -> Result<(Proposal, Arc<DaoBinding>), AppError> {
        let guild_id = command
            .guild_id
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| validation_error(DIRECT_MESSAGE))?;

        let dao = self
            .directory
            .lookup(&guild_id)
            .await
            .ok_or_else(|| validation_error(UNBOUND_GUILD))?;

        let description = command
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| validation_error(MISSING_DESCRIPTION))?;

        let now = self.clock.now();
        if command.deadline <= now {
            return Err(validation_error(PAST_DEADLINE));
        }

        let proposal = Proposal::new(
            MessageRef {
                guild_id,
                channel_id: command.channel_id,
                message_id: command.message_id,
            },
            description,
            command.deadline,
            dao.dao.name.clone(),
            now,
        );
        Ok((proposal, dao))
    }

    /// Connect a guild to a registered DAO
    pub async fn setup(&self, command: SetupCommand) -> Result<Arc<DaoBinding>, AppError> {
        let dao_name = command
            .dao_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| validation_error(MISSING_DAO_NAME))?;

        info!(
            guild_id = ?command.guild_id,
            "Received setup request trying to integrate with DAO named \"{}\"",
            dao_name
        );

        if !command
            .requester_permissions
            .iter()
            .any(|p| p == ADMIN_PERMISSION)
        {
            return Err(AppError::Forbidden(NOT_ADMIN.to_string()));
        }

        let guild_id = command
            .guild_id
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| validation_error(DIRECT_MESSAGE))?;

        let entry = self
            .registry
            .find_by_name(&dao_name)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Sorry, couldn't find a registered DAO named \"{}\"",
                    dao_name
                ))
            })?;

        let binding = DaoBinding {
            guild_id,
            dao: entry,
            grace_period: command.grace_period.unwrap_or(self.default_grace_period),
        };
        if binding.has_delay_mismatch() {
            warn!(
                dao = %binding.dao.name,
                queue_execution_delay = %binding.dao.queue.config.execution_delay,
                grace_period_secs = binding.grace_period.as_secs(),
                "Queue execution delay differs from the relay grace period"
            );
        }

        Ok(self.directory.bind(binding).await)
    }
}

/// Reply sent after a successful setup
pub fn setup_message(dao_name: &str) -> String {
    format!(
        "Congrats to you and your fellow server members! \
         This server is now connected to the DAO named \"{}\".",
        dao_name
    )
}
