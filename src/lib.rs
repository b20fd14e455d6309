//! # Casper contract deployer
//!
//! Deploys a compiled smart contract to a Casper network by talking JSON-RPC to a single node:
//! the node's current state root hash is fetched first, then the deploy is submitted with
//! `account_put_deploy`.
//!
//! The [`Deployer`](deployer/struct.Deployer.html) drives a run. It is generic over the
//! [`RpcTransport`](rpc/trait.RpcTransport.html) used to reach the node and the
//! [`FileSource`](source/trait.FileSource.html) the contract and key are read from, so both can be
//! swapped out in tests.

#![warn(missing_docs, trivial_casts, trivial_numeric_casts, unused_qualifications)]

pub mod cli;
pub mod config;
pub mod deployer;
mod error;
pub mod logging;
pub mod rpc;
pub mod source;
pub mod types;

pub use config::Config;
pub use deployer::{DeployOutcome, Deployer, FailedAt, Stage};
pub use error::{Error, Result};
