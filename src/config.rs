//! Configuration file management.
//!
//! Configuration is loaded from TOML files, but all configuration values have sensible defaults
//! pointing at the public Casper testnet. Running the following will dump a default configuration
//! file to stdout:
//! ```text
//! casper-deployer generate-config
//! ```
//!
//! # Adding a configuration section
//!
//! When adding a section to the configuration, ensure that
//!
//! * it has an entry in the root configuration [`Config`](struct.Config.html),
//! * `Default` is implemented (derived or manually) with sensible defaults, and
//! * it is completely documented.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{logging::LoggingConfig, types::TimeDiff};

const DEFAULT_NODE_URL: &str = "https://node.testnet.cspr.cloud/rpc";
const DEFAULT_CHAIN_NAME: &str = "casper-test";
const DEFAULT_TTL: TimeDiff = TimeDiff::from_seconds(30 * 60);
const DEFAULT_PAYMENT_AMOUNT: &str = "10000000000";
const DEFAULT_PACKAGE_HASH: &str =
    "hash-0000000000000000000000000000000000000000000000000000000000000000";
const DEFAULT_EXPLORER_DEPLOY_URL: &str = "https://testnet.cspr.cloud/deploy";

/// Root configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The node to talk to.
    pub node: NodeConfig,
    /// What to deploy and how.
    pub deploy: DeployConfig,
    /// Block explorer links.
    pub explorer: ExplorerConfig,
    /// Log configuration.
    pub logging: LoggingConfig,
}

/// Node RPC endpoint configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Full URL of the node's JSON-RPC endpoint.
    pub url: String,
    /// Sent verbatim as the `Authorization` header on every request.
    pub access_token: String,
    /// Per-request timeout. No timeout is applied if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<TimeDiff>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            url: DEFAULT_NODE_URL.to_string(),
            access_token: String::new(),
            request_timeout: None,
        }
    }
}

/// Which code the session part of the deploy runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    /// Call an entry point of the configured contract package.
    StoredContract,
    /// Ship the WASM file itself.
    ModuleBytes,
}

/// Deploy contents.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Name of the chain, e.g. `casper-test`.
    pub chain_name: String,
    /// File holding the account's secret key.
    pub secret_key_path: PathBuf,
    /// The compiled contract.
    pub wasm_path: PathBuf,
    /// Time-to-live of the deploy.
    pub ttl: TimeDiff,
    /// Gas price in motes.
    pub gas_price: u64,
    /// Payment amount in motes, as a decimal string.
    pub payment_amount: String,
    /// Contract package called by both the payment and the stored-contract session.
    pub package_hash: String,
    /// Entry point used for payment.
    pub payment_entry_point: String,
    /// Entry point used for a stored-contract session.
    pub session_entry_point: String,
    /// What the session runs.
    pub session_kind: SessionKind,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            chain_name: DEFAULT_CHAIN_NAME.to_string(),
            secret_key_path: PathBuf::from("secret_key.pem"),
            wasm_path: PathBuf::from("contract.wasm"),
            ttl: DEFAULT_TTL,
            gas_price: 1,
            payment_amount: DEFAULT_PAYMENT_AMOUNT.to_string(),
            package_hash: DEFAULT_PACKAGE_HASH.to_string(),
            payment_entry_point: "standard_payment".to_string(),
            session_entry_point: "call".to_string(),
            session_kind: SessionKind::StoredContract,
        }
    }
}

/// Block explorer configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplorerConfig {
    /// Prefix a deploy hash is appended to.
    pub deploy_url_prefix: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            deploy_url_prefix: DEFAULT_EXPLORER_DEPLOY_URL.to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Returns the explorer page of the given deploy.
    pub fn deploy_url(&self, deploy_hash: &str) -> String {
        format!(
            "{}/{}",
            self.deploy_url_prefix.trim_end_matches('/'),
            deploy_hash
        )
    }
}

/// Loads a TOML-formatted configuration from a given file.
pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> anyhow::Result<Config> {
    let path_ref = config_path.as_ref();
    toml::from_str(
        &fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read configuration file {:?}", path_ref))?,
    )
    .with_context(|| format!("Failed to parse configuration file {:?}", path_ref))
}

/// Creates a TOML-formatted string from a given configuration.
pub fn to_string(cfg: &Config) -> anyhow::Result<String> {
    toml::to_string_pretty(cfg).with_context(|| "Failed to serialize default configuration")
}
