use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Public Solana clusters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Mainnet,
    #[default]
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    /// Public JSON-RPC endpoint for this cluster
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "Solana Mainnet Beta",
            Cluster::Devnet => "Solana Devnet",
            Cluster::Testnet => "Solana Testnet",
            Cluster::Localnet => "Local Validator",
        }
    }

    /// Whether balances on this cluster carry real value
    pub fn is_testnet(&self) -> bool {
        !matches!(self, Cluster::Mainnet)
    }
}

impl FromStr for Cluster {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "localnet" | "localhost" => Ok(Cluster::Localnet),
            other => Err(LedgerError::InvalidConfig(format!(
                "unknown cluster {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How settled ledger state must be before the node answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

/// Ledger RPC client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    pub url: String,
    /// Per-request timeout covering connect, send and body read
    pub timeout: Duration,
    /// Commitment level for reads and transaction preflight
    pub commitment: Commitment,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::for_cluster(Cluster::default())
    }
}

impl RpcConfig {
    /// Configuration for a custom endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
            commitment: Commitment::default(),
        }
    }

    /// Configuration for a public cluster endpoint.
    pub fn for_cluster(cluster: Cluster) -> Self {
        Self::new(cluster.rpc_url())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Reject configurations no request could succeed with.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(LedgerError::InvalidConfig(format!(
                "RPC URL must be http(s): {:?}",
                self.url
            )));
        }
        if self.timeout.is_zero() {
            return Err(LedgerError::InvalidConfig("timeout must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_devnet() {
        let config = RpcConfig::default();
        assert_eq!(config.url, "https://api.devnet.solana.com");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.commitment, Commitment::Confirmed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cluster_from_str() {
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("Devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("localhost".parse::<Cluster>().unwrap(), Cluster::Localnet);
        assert!("moonnet".parse::<Cluster>().is_err());
    }

    #[test]
    fn only_mainnet_is_not_testnet() {
        assert!(!Cluster::Mainnet.is_testnet());
        assert!(Cluster::Devnet.is_testnet());
        assert!(Cluster::Localnet.is_testnet());
    }

    #[test]
    fn commitment_serializes_lowercase() {
        let json = serde_json::to_string(&Commitment::Finalized).unwrap();
        assert_eq!(json, "\"finalized\"");
    }

    #[test]
    fn validate_rejects_bad_config() {
        assert!(RpcConfig::new("ftp://example.com").validate().is_err());
        assert!(RpcConfig::new("https://example.com")
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn builder_overrides() {
        let config = RpcConfig::for_cluster(Cluster::Testnet)
            .with_timeout(Duration::from_secs(5))
            .with_commitment(Commitment::Finalized);
        assert_eq!(config.url, Cluster::Testnet.rpc_url());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.commitment, Commitment::Finalized);
    }
}
