//! Types which make up the `account_put_deploy` payload.

mod deploy;
mod timestamp;

pub use deploy::{
    Deploy, DeployHeader, DeployParams, ExecutableDeployItem, RuntimeArg, StoredValue, U512,
};
pub use timestamp::{TimeDiff, TimeDiffParseError, Timestamp};
