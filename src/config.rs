//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0),
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Ethereum network the governance contracts live on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EthNetwork {
    #[default]
    Development,
    Production,
}

impl EthNetwork {
    /// Block explorer host used for transaction links
    pub fn explorer_host(&self) -> &'static str {
        match self {
            EthNetwork::Development => "rinkeby.etherscan.io",
            EthNetwork::Production => "etherscan.io",
        }
    }

    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("https://{}/tx/{}", self.explorer_host(), tx_hash)
    }
}

impl FromStr for EthNetwork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(EthNetwork::Development),
            "production" | "prod" => Ok(EthNetwork::Production),
            other => Err(ConfigError::InvalidValue(format!(
                "ETH_NETWORK must be 'development' or 'production', got '{}'",
                other
            ))),
        }
    }
}

/// Oracle network configuration
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Base URLs of the reaction monitors queried by the oracle witnesses
    pub reaction_monitors: Vec<url::Url>,
    pub witnesses: u16,
    pub min_consensus_percentage: u8,
    /// How long to wait for a tally before giving up on the proposal
    pub tally_timeout: Duration,
    pub submit_attempts: u32,
    pub retry_backoff: Duration,
    /// Resolution latency of the local oracle network
    pub resolution_latency: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            reaction_monitors: vec![
                url::Url::parse("https://witnet-reactions.example.org/")
                    .expect("static url"),
                url::Url::parse("https://aragon-reactions.example.org/")
                    .expect("static url"),
                url::Url::parse("https://otherplane-reactions.example.org/")
                    .expect("static url"),
            ],
            witnesses: 3,
            min_consensus_percentage: 51,
            tally_timeout: Duration::from_secs(600),
            submit_attempts: 1,
            retry_backoff: Duration::from_millis(500),
            resolution_latency: Duration::from_secs(30),
        }
    }
}

/// Proposal pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Wait between reporting and executing, used when a DAO binding has no override
    pub default_grace_period: Duration,
    /// Longest single timer armed while waiting for a deadline
    pub max_timer_arm: Duration,
    pub notify_on_tally_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_grace_period: Duration::from_secs(60),
            max_timer_arm: Duration::from_secs(86_400),
            notify_on_tally_failure: false,
        }
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub network: EthNetwork,
    pub registry_path: Option<PathBuf>,
    pub oracle: OracleConfig,
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: parse_or(&lookup, "HOST", ServerConfig::default().host)?,
            port: parse_or(&lookup, "PORT", ServerConfig::default().port)?,
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let network = parse_or(&lookup, "ETH_NETWORK", EthNetwork::default())?;
        let registry_path = lookup("REGISTRY_PATH").map(PathBuf::from);

        let defaults = OracleConfig::default();
        let reaction_monitors = match lookup("REACTION_MONITORS") {
            Some(raw) => Self::parse_monitors(&raw)?,
            None => defaults.reaction_monitors,
        };
        let min_consensus_percentage: u8 =
            parse_or(&lookup, "ORACLE_MIN_CONSENSUS_PCT", defaults.min_consensus_percentage)?;
        if !(51..=99).contains(&min_consensus_percentage) {
            return Err(ConfigError::InvalidValue(
                "ORACLE_MIN_CONSENSUS_PCT must be between 51 and 99".to_string(),
            ));
        }
        let submit_attempts: u32 =
            parse_or(&lookup, "ORACLE_SUBMIT_ATTEMPTS", defaults.submit_attempts)?;
        if submit_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "ORACLE_SUBMIT_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        let oracle = OracleConfig {
            reaction_monitors,
            witnesses: parse_or(&lookup, "ORACLE_WITNESSES", defaults.witnesses)?,
            min_consensus_percentage,
            tally_timeout: secs_or(&lookup, "ORACLE_TALLY_TIMEOUT_SECS", defaults.tally_timeout)?,
            submit_attempts,
            retry_backoff: Duration::from_millis(parse_or(
                &lookup,
                "ORACLE_RETRY_BACKOFF_MS",
                defaults.retry_backoff.as_millis() as u64,
            )?),
            resolution_latency: secs_or(
                &lookup,
                "ORACLE_RESOLUTION_SECS",
                defaults.resolution_latency,
            )?,
        };

        let defaults = PipelineConfig::default();
        let max_timer_arm = secs_or(&lookup, "MAX_TIMER_ARM_SECS", defaults.max_timer_arm)?;
        if max_timer_arm.is_zero() {
            return Err(ConfigError::InvalidValue(
                "MAX_TIMER_ARM_SECS must be greater than zero".to_string(),
            ));
        }
        let pipeline = PipelineConfig {
            default_grace_period: secs_or(
                &lookup,
                "DEFAULT_GRACE_PERIOD_SECS",
                defaults.default_grace_period,
            )?,
            max_timer_arm,
            notify_on_tally_failure: parse_or(
                &lookup,
                "NOTIFY_ON_TALLY_FAILURE",
                defaults.notify_on_tally_failure,
            )?,
        };

        Ok(Self {
            server,
            cors,
            network,
            registry_path,
            oracle,
            pipeline,
        })
    }

    /// Parse a comma separated list of reaction monitor base URLs
    fn parse_monitors(raw: &str) -> Result<Vec<url::Url>, ConfigError> {
        let monitors = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                url::Url::parse(s).map_err(|e| {
                    ConfigError::InvalidValue(format!(
                        "Invalid REACTION_MONITORS entry '{}': {}",
                        s, e
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if monitors.is_empty() {
            return Err(ConfigError::InvalidValue(
                "REACTION_MONITORS must list at least one URL".to_string(),
            ));
        }
        Ok(monitors)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", key, e))),
        None => Ok(default),
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    parse_or(lookup, key, default.as_secs()).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let settings = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(settings.network, EthNetwork::Development);
        assert_eq!(settings.pipeline.default_grace_period, Duration::from_secs(60));
        assert_eq!(settings.pipeline.max_timer_arm, Duration::from_secs(86_400));
        assert_eq!(settings.oracle.submit_attempts, 1);
        assert_eq!(settings.oracle.reaction_monitors.len(), 3);
        assert!(!settings.pipeline.notify_on_tally_failure);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("ETH_NETWORK", "production"),
            ("REACTION_MONITORS", "https://a.example/, https://b.example/"),
            ("ORACLE_TALLY_TIMEOUT_SECS", "120"),
            ("NOTIFY_ON_TALLY_FAILURE", "true"),
        ]))
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.network, EthNetwork::Production);
        assert_eq!(settings.oracle.reaction_monitors.len(), 2);
        assert_eq!(settings.oracle.tally_timeout, Duration::from_secs(120));
        assert!(settings.pipeline.notify_on_tally_failure);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::from_lookup(lookup_from(&[("PORT", "not-a-port")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("ETH_NETWORK", "ropsten")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("REACTION_MONITORS", "nope")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("ORACLE_SUBMIT_ATTEMPTS", "0")])).is_err());
        assert!(Settings::from_lookup(lookup_from(&[("MAX_TIMER_ARM_SECS", "0")])).is_err());
    }

    #[test]
    fn test_explorer_links() {
        assert_eq!(
            EthNetwork::Production.tx_url("0xabc"),
            "https://etherscan.io/tx/0xabc"
        );
        assert_eq!(EthNetwork::Development.explorer_host(), "rinkeby.etherscan.io");
    }
}
