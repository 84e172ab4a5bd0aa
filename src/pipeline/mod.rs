//! Proposal Pipeline Module
//!
//! Carries an accepted proposal through its time-delayed lifecycle:
//!
//! 1. **Schedule**: wait for the voting deadline
//! 2. **Request**: build and submit an oracle data request for the proposal message
//! 3. **Tally**: wait (bounded) for the oracle network to resolve it
//! 4. **Report**: schedule the result on the DAO's governance queue
//! 5. **Execute**: after the DAO's grace period, execute the scheduled result

pub mod notify;
pub mod orchestrator;
pub mod proposal;
pub mod schedule;
pub mod state;
pub mod store;

// Re-export main types for convenient access
pub use notify::{Notifier, OutboxNotifier};
pub use orchestrator::{Collaborators, ProposalOrchestrator};
pub use proposal::{MessageRef, Proposal};
pub use store::ProposalStore;
