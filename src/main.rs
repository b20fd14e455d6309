//! # Casper contract deployer
//!
//! Run with `--help` to see available command-line arguments.

use structopt::StructOpt;

use casper_deployer::cli::Cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    // Parse CLI args and run selected subcommand.
    let opts = Cli::from_args();
    opts.run().await
}
