//! Oracle module
//!
//! Builds data requests for proposal messages and talks to the oracle
//! network that resolves them into tallies.

mod client;
mod local;
mod request;
mod retry;

pub use client::{OracleClient, RequestId, TallyResult};
pub use local::LocalOracleNetwork;
pub use request::{OracleRequest, OracleRequestBuilder};
pub use retry::{RetryPolicy, RetryingOracleClient};
