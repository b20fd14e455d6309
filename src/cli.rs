//! Command-line option parsing.
//!
//! Most settings come from the configuration file, however the values needed to point the tool at a
//! different node, chain or contract can be overwritten for convenience's sake.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use structopt::StructOpt;
use tracing::warn;

use crate::{
    config::{self, Config},
    deployer::Deployer,
    logging,
    rpc::HttpTransport,
    source::LocalFiles,
    types::Deploy,
};

// Note: The docstring on `Cli` is the help shown when calling the binary with `--help`.
#[derive(Debug, StructOpt)]
/// Deploys a smart contract to a Casper network through a node's JSON-RPC API.
pub enum Cli {
    /// Read the contract and secret key, fetch the state root hash and submit the deploy.
    Deploy {
        #[structopt(flatten)]
        options: DeployOptions,
    },
    /// Print the node's current state root hash.
    GetStateRootHash {
        #[structopt(flatten)]
        options: DeployOptions,
    },
    /// Build the deploy and write it as JSON without sending it.
    MakeDeploy {
        #[structopt(flatten)]
        options: DeployOptions,

        /// Output file. Writes to stdout if not given.
        #[structopt(short, long)]
        output: Option<PathBuf>,
    },
    /// Send a deploy previously written by `make-deploy`.
    SendDeploy {
        #[structopt(flatten)]
        options: DeployOptions,

        /// Deploy JSON file.
        #[structopt(short, long)]
        input: PathBuf,
    },
    /// Generate a configuration file from defaults and dump it to stdout.
    GenerateConfig {},
}

/// Options shared by every command talking to a node.
#[derive(Debug, StructOpt)]
pub struct DeployOptions {
    /// Path to configuration file.
    #[structopt(short, long, env = "CASPER_DEPLOYER_CONFIG")]
    config: Option<PathBuf>,

    /// Override log-level, forcing debug output.
    #[structopt(short, long)]
    debug: bool,

    /// JSON-RPC endpoint of the node.
    #[structopt(long)]
    node_url: Option<String>,

    /// Value of the Authorization header.
    #[structopt(long, env = "CSPR_CLOUD_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Name of the target chain.
    #[structopt(long)]
    chain_name: Option<String>,

    /// Path to the compiled contract.
    #[structopt(long)]
    wasm: Option<PathBuf>,

    /// Path to the secret key file.
    #[structopt(long)]
    secret_key: Option<PathBuf>,
}

impl DeployOptions {
    /// Loads the specified config, if any, otherwise uses defaults, then applies the overrides.
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut cfg = self
            .config
            .as_ref()
            .map(config::load_from_file)
            .transpose()?
            .unwrap_or_default();
        if self.debug {
            cfg.logging.level = tracing::Level::DEBUG;
        }
        if let Some(node_url) = &self.node_url {
            cfg.node.url = node_url.clone();
        }
        if let Some(access_token) = &self.access_token {
            cfg.node.access_token = access_token.clone();
        }
        if let Some(chain_name) = &self.chain_name {
            cfg.deploy.chain_name = chain_name.clone();
        }
        if let Some(wasm) = &self.wasm {
            cfg.deploy.wasm_path = wasm.clone();
        }
        if let Some(secret_key) = &self.secret_key {
            cfg.deploy.secret_key_path = secret_key.clone();
        }
        Ok(cfg)
    }

    /// Loads the configuration, installs logging and wires up a deployer reporting to stdout.
    fn into_deployer(self) -> anyhow::Result<Deployer<HttpTransport, LocalFiles, io::Stdout>> {
        let cfg = self.load_config()?;
        logging::init_with_config(&cfg.logging)?;
        if cfg.node.access_token.is_empty() {
            warn!("no access token configured, the node may refuse the requests");
        }
        let transport = HttpTransport::new(&cfg.node)?;
        Ok(Deployer::new(cfg, transport, LocalFiles, io::stdout()))
    }
}

impl Cli {
    /// Execute selected CLI command.
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Cli::Deploy { options } => {
                let mut deployer = options.into_deployer()?;
                deployer.run().await?;
                Ok(())
            }
            Cli::GetStateRootHash { options } => {
                let mut deployer = options.into_deployer()?;
                deployer.fetch_state_root_hash().await?;
                Ok(())
            }
            Cli::MakeDeploy { options, output } => {
                let mut deployer = options.into_deployer()?;
                let inputs = deployer.load_inputs()?;
                let deploy = deployer.build_deploy(&inputs)?;
                deploy.write_deploy(output.as_deref())?;
                Ok(())
            }
            Cli::SendDeploy { options, input } => {
                let mut deployer = options.into_deployer()?;
                let deploy = Deploy::read_deploy(&input)?;
                deployer.submit_deploy(&deploy).await?;
                Ok(())
            }
            Cli::GenerateConfig {} => {
                let cfg_str = config::to_string(&Default::default())?;
                io::stdout().write_all(cfg_str.as_bytes())?;

                Ok(())
            }
        }
    }
}
