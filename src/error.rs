use reqwest::StatusCode;
use thiserror::Error;

/// Crate-wide Result type wrapper.
pub type Result<T> = std::result::Result<T, Error>;

/// Error that can be returned while preparing or submitting a deploy.
#[derive(Error, Debug)]
pub enum Error {
    /// Context-adding wrapper for `std::io::Error`.
    #[error("io::Error Context: {context} - IoError: {error}")]
    IoError {
        /// Contextual description of where this error occurred including relevant paths.
        context: String,
        /// std::io::Error raised during the operation in question.
        error: std::io::Error,
    },

    /// Failed to construct the HTTP client.
    #[error("failed to build http client: {0}")]
    FailedToBuildClient(reqwest::Error),

    /// Failed to get a response from the node.
    #[error("failed to get rpc response: {0}")]
    FailedToGetResponse(reqwest::Error),

    /// The node replied with a status other than 200.
    #[error("{method} returned {status}: {body}")]
    UnexpectedStatus {
        /// The JSON-RPC method which was called.
        method: &'static str,
        /// The HTTP status of the reply.
        status: StatusCode,
        /// The raw reply body.
        body: String,
    },

    /// Invalid JSON returned from the node or read from a file.
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The reply parsed as JSON but lacked a field we rely on.
    #[error("{method} response has no {field}: {response}")]
    MissingField {
        /// The JSON-RPC method which was called.
        method: &'static str,
        /// Dotted path of the missing field.
        field: &'static str,
        /// The full response.
        response: serde_json::Value,
    },

    /// The node accepted the HTTP request but did not accept the deploy.
    #[error("deploy rejected: {0}")]
    DeployRejected(serde_json::Value),

    /// Invalid argument.
    #[error("invalid argument {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, error: std::io::Error) -> Self {
        Error::IoError {
            context: context.into(),
            error,
        }
    }
}
