use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{TimeDiff, Timestamp};
use crate::error::{Error, Result};

/// The CL type name of a payment amount.
const U512_CL_TYPE: &str = "U512";

/// A typed argument passed to an entry point, carrying both its serialized and parsed forms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeArg {
    /// Name of the CL type, e.g. `U512`.
    pub cl_type: String,
    /// Hex encoded bytesrepr serialization of the value.
    pub bytes: String,
    /// Human-readable form of the value.
    pub parsed: String,
}

#[allow(
    clippy::assign_op_pattern,
    clippy::ptr_offset_with_cast,
    clippy::range_plus_one,
    clippy::manual_range_contains
)]
mod macro_code {
    use uint::construct_uint;

    construct_uint! {
        /// 512-bit unsigned integer, the type of payment amounts.
        pub struct U512(8);
    }
}

pub use self::macro_code::U512;

/// Width of a `U512` in bytes.
const U512_SERIALIZED_LENGTH: usize = 64;

impl RuntimeArg {
    /// Constructs a `U512` argument.
    ///
    /// The bytesrepr form of a `U512` is a single length byte followed by the minimal
    /// little-endian magnitude, so zero encodes as `00`.
    pub fn u512(value: U512) -> Self {
        let mut buf = [0u8; U512_SERIALIZED_LENGTH];
        value.to_little_endian(&mut buf);
        let mut non_zero_bytes: Vec<u8> =
            buf.iter().rev().skip_while(|byte| **byte == 0).cloned().collect();
        // At most 64 bytes, so the length always fits.
        let num_bytes = non_zero_bytes.len() as u8;
        non_zero_bytes.push(num_bytes);
        non_zero_bytes.reverse();
        RuntimeArg {
            cl_type: U512_CL_TYPE.to_string(),
            bytes: hex::encode(non_zero_bytes),
            parsed: value.to_string(),
        }
    }

    /// Parses a decimal amount of motes into a `U512` argument.
    pub fn u512_from_str(value: &str) -> Result<Self> {
        U512::from_dec_str(value.trim())
            .map(RuntimeArg::u512)
            .map_err(|error| Error::InvalidArgument(format!("amount '{}': {:?}", value, error)))
    }
}

/// Code stored on chain, referenced rather than shipped with the deploy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredValue {
    /// An entry point of a contract package, addressed by its hash.
    StoredContract {
        /// Formatted package hash, `hash-<64 hex digits>`.
        package_hash: String,
        /// Name of the entry point to call.
        entry_point: String,
        /// Arguments to the entry point.
        args: Vec<RuntimeArg>,
    },
}

/// The payment or session part of a deploy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutableDeployItem {
    /// Raw WASM shipped inside the deploy.
    ModuleBytes {
        /// Hex encoded module.
        module_bytes: String,
        /// Arguments to the module's `call` function.
        args: Vec<RuntimeArg>,
    },
    /// A reference to stored code.
    StoredValue(StoredValue),
}

impl ExecutableDeployItem {
    /// Calls `entry_point` of the contract package `package_hash`.
    pub fn stored_contract(
        package_hash: impl Into<String>,
        entry_point: impl Into<String>,
        args: Vec<RuntimeArg>,
    ) -> Self {
        ExecutableDeployItem::StoredValue(StoredValue::StoredContract {
            package_hash: package_hash.into(),
            entry_point: entry_point.into(),
            args,
        })
    }

    /// Ships `module_bytes` as the code to execute.
    pub fn module_bytes(module_bytes: &[u8], args: Vec<RuntimeArg>) -> Self {
        ExecutableDeployItem::ModuleBytes {
            module_bytes: hex::encode(module_bytes),
            args,
        }
    }
}

/// The header portion of a deploy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployHeader {
    /// The account on whose behalf the deploy is sent.
    pub account: String,
    /// Creation time of the deploy.
    pub timestamp: Timestamp,
    /// How long the deploy stays valid after `timestamp`.
    pub ttl: TimeDiff,
    /// Gas price in motes.
    pub gas_price: u64,
    /// Hash of the deploy body. Left empty, the node is expected to reject or recompute it.
    pub body_hash: String,
    /// Deploys which must be executed before this one.
    pub dependencies: Vec<String>,
    /// Name of the chain the deploy is meant for.
    pub chain_name: String,
}

/// A deploy as accepted by `account_put_deploy`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deploy {
    /// The deploy header.
    pub header: DeployHeader,
    /// Code paying for the execution.
    pub payment: ExecutableDeployItem,
    /// Code doing the actual work.
    pub session: ExecutableDeployItem,
}

/// The header values of a deploy which is about to be built.
#[derive(Clone, Debug)]
pub struct DeployParams {
    /// Account identifier placed into the header.
    pub account: String,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Time-to-live.
    pub ttl: TimeDiff,
    /// Gas price.
    pub gas_price: u64,
    /// Dependency deploy hashes.
    pub dependencies: Vec<String>,
    /// Target chain.
    pub chain_name: String,
}

/// Creates a Write trait object for File or Stdout respective to the path value passed
/// Stdout is used when None
fn output_or_stdout(maybe_path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match maybe_path {
        Some(output_path) => File::create(output_path).map(|f| Box::new(f) as Box<dyn Write>),
        None => Ok(Box::new(io::stdout()) as Box<dyn Write>),
    }
}

impl Deploy {
    /// Assembles a deploy from its header values and its two executable items.
    pub fn with_payment_and_session(
        params: DeployParams,
        payment: ExecutableDeployItem,
        session: ExecutableDeployItem,
    ) -> Deploy {
        let DeployParams {
            account,
            timestamp,
            ttl,
            gas_price,
            dependencies,
            chain_name,
        } = params;
        Deploy {
            header: DeployHeader {
                account,
                timestamp,
                ttl,
                gas_price,
                body_hash: String::new(),
                dependencies,
                chain_name,
            },
            payment,
            session,
        }
    }

    /// Write the deploy to a file, or if maybe_path is None, stdout
    pub fn write_deploy(&self, maybe_path: Option<&Path>) -> Result<()> {
        let context = || match maybe_path {
            Some(path) => format!("unable to write deploy to {}", path.display()),
            None => "unable to write deploy to stdout".to_string(),
        };
        let mut out = output_or_stdout(maybe_path).map_err(|error| Error::io(context(), error))?;
        let content = serde_json::to_string_pretty(self)?;
        out.write_all(content.as_bytes())
            .map_err(|error| Error::io(context(), error))
    }

    /// Read a deploy from a file
    pub fn read_deploy(input_path: &Path) -> Result<Deploy> {
        let file = File::open(input_path).map_err(|error| {
            Error::io(
                format!("unable to read deploy from {}", input_path.display()),
                error,
            )
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
