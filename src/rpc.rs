//! JSON-RPC plumbing between the deployer and a node.

use async_trait::async_trait;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    StatusCode,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    config::NodeConfig,
    error::{Error, Result},
};

/// Method returning the state root hash of the latest block.
pub const GET_STATE_ROOT_HASH: &str = "chain_get_state_root_hash";
/// Method accepting a deploy for execution.
pub const PUT_DEPLOY: &str = "account_put_deploy";

const JSON_RPC_VERSION: &str = "2.0";
const APPLICATION_JSON: &str = "application/json";

/// A JSON-RPC 2.0 request envelope.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RpcRequest {
    jsonrpc: &'static str,
    /// The method to invoke.
    pub method: &'static str,
    /// Method parameters, an array or an object.
    pub params: Value,
    /// Request id echoed back by the node.
    pub id: u64,
}

impl RpcRequest {
    /// Builds a request envelope around the given parameters.
    pub fn new<P: Serialize>(id: u64, method: &'static str, params: P) -> Result<Self> {
        Ok(RpcRequest {
            jsonrpc: JSON_RPC_VERSION,
            method,
            params: serde_json::to_value(params)?,
            id,
        })
    }
}

/// The HTTP status and raw body a node replied with.
#[derive(Clone, Debug)]
pub struct RpcReply {
    /// HTTP status of the reply.
    pub status: StatusCode,
    /// Undecoded body.
    pub body: String,
}

impl RpcReply {
    /// Decodes the body as JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends JSON-RPC requests to a node.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Posts `request` and returns whatever the node replied, regardless of HTTP status.
    async fn send(&self, request: &RpcRequest) -> Result<RpcReply>;
}

/// Transport posting requests over HTTP(S) with `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    access_token: String,
}

impl HttpTransport {
    /// Creates a transport for the configured node.
    pub fn new(config: &NodeConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout.into());
        }
        let client = builder.build().map_err(Error::FailedToBuildClient)?;
        Ok(HttpTransport {
            client,
            url: config.url.clone(),
            access_token: config.access_token.clone(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, request: &RpcRequest) -> Result<RpcReply> {
        debug!(method = request.method, id = request.id, url = %self.url, "sending rpc request");
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, self.access_token.as_str())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .json(request)
            .send()
            .await
            .map_err(Error::FailedToGetResponse)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(Error::FailedToGetResponse)?;
        debug!(method = request.method, %status, bytes = body.len(), "received rpc reply");
        Ok(RpcReply { status, body })
    }
}
