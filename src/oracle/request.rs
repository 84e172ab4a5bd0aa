//! Oracle data request construction
//!
//! A request asks the witnesses to read the reaction count of one chat
//! message from every configured reaction monitor and agree on the result.

use crate::config::OracleConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How the witnesses fetch a data point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalSource {
    pub kind: RetrievalKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RetrievalKind {
    HttpGet,
}

/// Reducer applied when combining retrieved values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    Mode,
}

/// One submission to the oracle network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    pub channel_id: String,
    pub message_id: String,
    pub retrieve: Vec<RetrievalSource>,
    pub aggregate: Reducer,
    pub tally: Reducer,
    pub witnesses: u16,
    pub min_consensus_percentage: u8,
}

impl OracleRequest {
    /// Stable hex digest of the request body
    pub fn digest(&self) -> String {
        // serde_json keeps struct field order, so the encoding is stable
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&encoded);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Builds oracle requests for proposal messages. Performs no I/O.
#[derive(Debug, Clone)]
pub struct OracleRequestBuilder {
    monitors: Vec<String>,
    witnesses: u16,
    min_consensus_percentage: u8,
}

impl OracleRequestBuilder {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            monitors: config
                .reaction_monitors
                .iter()
                .map(|url| url.as_str().trim_end_matches('/').to_string())
                .collect(),
            witnesses: config.witnesses,
            min_consensus_percentage: config.min_consensus_percentage,
        }
    }

    /// Build the request for the message at `(channel_id, message_id)`
    pub fn build(&self, channel_id: &str, message_id: &str) -> OracleRequest {
        let retrieve = self
            .monitors
            .iter()
            .map(|base| RetrievalSource {
                kind: RetrievalKind::HttpGet,
                url: format!("{}/channels/{}/messages/{}", base, channel_id, message_id),
            })
            .collect();

        OracleRequest {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            retrieve,
            aggregate: Reducer::Mode,
            tally: Reducer::Mode,
            witnesses: self.witnesses,
            min_consensus_percentage: self.min_consensus_percentage,
        }
    }
}
