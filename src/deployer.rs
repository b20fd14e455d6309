//! The deploy orchestrator.
//!
//! A run reads the WASM module and the secret key, asks the node for its current state root hash,
//! builds a deploy and submits it with `account_put_deploy`. Progress is reported line by line to
//! the injected output, failures additionally come back as [`Error`] values.

use std::{fmt::Display, io::Write};

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, SessionKind},
    error::{Error, Result},
    rpc::{RpcReply, RpcRequest, RpcTransport, GET_STATE_ROOT_HASH, PUT_DEPLOY},
    source::FileSource,
    types::{Deploy, DeployParams, ExecutableDeployItem, RuntimeArg, Timestamp},
};

const STATE_ROOT_HASH_RPC_ID: u64 = 1;
const PUT_DEPLOY_RPC_ID: u64 = 2;

#[derive(Serialize)]
struct PutDeployParams<'a> {
    deploy: &'a Deploy,
}

/// Where a deploy run currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Reading the WASM module and the secret key.
    LoadingInputs,
    /// Waiting for `chain_get_state_root_hash`.
    FetchingState,
    /// Waiting for `account_put_deploy`.
    SubmittingDeploy,
    /// The node accepted the deploy.
    Done,
    /// The run stopped early.
    Failed(FailedAt),
}

/// The stage a failed run stopped in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedAt {
    /// Announcing the run, or reading the WASM module or the secret key.
    LoadingInputs,
    /// Getting the state root hash.
    FetchingState,
    /// Building or sending the deploy.
    SubmittingDeploy,
}

/// File contents a deploy is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployInputs {
    /// The compiled contract.
    pub wasm: Vec<u8>,
    /// Secret key file contents, trimmed.
    pub secret_key: String,
}

/// What the node told us about an accepted deploy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployReceipt {
    /// Hash the node assigned to the deploy.
    pub deploy_hash: String,
    /// Explorer page of the deploy.
    pub explorer_url: String,
}

/// Result of a complete run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployOutcome {
    /// State root hash reported before submitting.
    pub state_root_hash: String,
    /// Hash the node assigned to the deploy.
    pub deploy_hash: String,
    /// Explorer page of the deploy.
    pub explorer_url: String,
}

/// Drives a deploy against a single node.
pub struct Deployer<T, F, W> {
    config: Config,
    transport: T,
    files: F,
    out: W,
    stage: Stage,
}

impl<T, F, W> Deployer<T, F, W>
where
    T: RpcTransport,
    F: FileSource,
    W: Write,
{
    /// Creates a deployer which reports to `out`.
    pub fn new(config: Config, transport: T, files: F, out: W) -> Self {
        Deployer {
            config,
            transport,
            files,
            out,
            stage: Stage::LoadingInputs,
        }
    }

    /// Returns the current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Consumes the deployer, returning its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Performs a full deploy.
    ///
    /// Each step records its own failure, so the stage afterwards says where the run stopped.
    pub async fn run(&mut self) -> Result<DeployOutcome> {
        self.enter(Stage::LoadingInputs);
        let announced = self.announce();
        self.fail_on_error(announced)?;
        let inputs = self.load_inputs()?;
        let state_root_hash = self.fetch_state_root_hash().await?;
        self.enter(Stage::SubmittingDeploy);
        let built = self.build_deploy(&inputs);
        let deploy = self.fail_on_error(built)?;
        let DeployReceipt {
            deploy_hash,
            explorer_url,
        } = self.submit_deploy(&deploy).await?;
        Ok(DeployOutcome {
            state_root_hash,
            deploy_hash,
            explorer_url,
        })
    }

    /// Prints what is about to be deployed where.
    pub fn announce(&mut self) -> Result<()> {
        let node_url = self.config.node.url.clone();
        let chain_name = self.config.deploy.chain_name.clone();
        let wasm_path = self.config.deploy.wasm_path.display().to_string();
        self.report(format_args!("🚀 Deploying contract to {}...", chain_name))?;
        self.report(format_args!("📡 Node: {}", node_url))?;
        self.report(format_args!("🔗 Chain: {}", chain_name))?;
        self.report(format_args!("📄 WASM: {}", wasm_path))
    }

    /// Reads the WASM module and the secret key.
    pub fn load_inputs(&mut self) -> Result<DeployInputs> {
        self.enter(Stage::LoadingInputs);
        let result = self.read_inputs();
        self.fail_on_error(result)
    }

    fn read_inputs(&self) -> Result<DeployInputs> {
        let wasm_path = &self.config.deploy.wasm_path;
        let wasm = self.files.read(wasm_path)?;
        info!(path = %wasm_path.display(), bytes = wasm.len(), "read wasm module");

        let key_path = &self.config.deploy.secret_key_path;
        let secret_key = self.files.read_to_string(key_path)?.trim().to_string();
        if secret_key.is_empty() {
            warn!(path = %key_path.display(), "secret key file is empty");
        }
        Ok(DeployInputs { wasm, secret_key })
    }

    /// Asks the node for its current state root hash.
    pub async fn fetch_state_root_hash(&mut self) -> Result<String> {
        self.enter(Stage::FetchingState);
        let result = self.request_state_root_hash().await;
        self.fail_on_error(result)
    }

    async fn request_state_root_hash(&mut self) -> Result<String> {
        self.report("📊 Getting current state...")?;
        let request = RpcRequest::new(STATE_ROOT_HASH_RPC_ID, GET_STATE_ROOT_HASH, json!([]))?;
        let reply = self.transport.send(&request).await?;
        if reply.status != StatusCode::OK {
            self.report(format_args!(
                "❌ Failed to get state: {}",
                reply.status.as_u16()
            ))?;
            return Err(self.unexpected_status(GET_STATE_ROOT_HASH, reply));
        }

        let response = self.parse_reply(&reply)?;
        let maybe_hash = response
            .get("result")
            .and_then(|result| result.get("state_root_hash"))
            .and_then(Value::as_str)
            .map(str::to_string);
        match maybe_hash {
            Some(state_root_hash) => {
                self.report(format_args!("✅ State root hash: {}", state_root_hash))?;
                Ok(state_root_hash)
            }
            None => {
                self.report(format_args!("❌ Unexpected state response: {}", response))?;
                Err(Error::MissingField {
                    method: GET_STATE_ROOT_HASH,
                    field: "result.state_root_hash",
                    response,
                })
            }
        }
    }

    /// Builds a deploy timestamped now.
    pub fn build_deploy(&self, inputs: &DeployInputs) -> Result<Deploy> {
        self.build_deploy_at(inputs, Timestamp::now())
    }

    /// Builds a deploy with the given timestamp.
    pub fn build_deploy_at(&self, inputs: &DeployInputs, timestamp: Timestamp) -> Result<Deploy> {
        let deploy_config = &self.config.deploy;
        let params = DeployParams {
            account: inputs.secret_key.clone(),
            timestamp,
            ttl: deploy_config.ttl,
            gas_price: deploy_config.gas_price,
            dependencies: vec![],
            chain_name: deploy_config.chain_name.clone(),
        };
        let payment = ExecutableDeployItem::stored_contract(
            deploy_config.package_hash.as_str(),
            deploy_config.payment_entry_point.as_str(),
            vec![RuntimeArg::u512_from_str(&deploy_config.payment_amount)?],
        );
        let session = match deploy_config.session_kind {
            SessionKind::StoredContract => ExecutableDeployItem::stored_contract(
                deploy_config.package_hash.as_str(),
                deploy_config.session_entry_point.as_str(),
                vec![],
            ),
            SessionKind::ModuleBytes => ExecutableDeployItem::module_bytes(&inputs.wasm, vec![]),
        };
        debug!(%timestamp, session_kind = ?deploy_config.session_kind, "built deploy");
        Ok(Deploy::with_payment_and_session(params, payment, session))
    }

    /// Sends `deploy` to the node.
    pub async fn submit_deploy(&mut self, deploy: &Deploy) -> Result<DeployReceipt> {
        self.enter(Stage::SubmittingDeploy);
        let result = self.put_deploy(deploy).await;
        if result.is_ok() {
            self.enter(Stage::Done);
        }
        self.fail_on_error(result)
    }

    async fn put_deploy(&mut self, deploy: &Deploy) -> Result<DeployReceipt> {
        self.report("📤 Sending deploy...")?;
        let request = RpcRequest::new(PUT_DEPLOY_RPC_ID, PUT_DEPLOY, PutDeployParams { deploy })?;
        let reply = self.transport.send(&request).await?;
        if reply.status != StatusCode::OK {
            self.report(format_args!(
                "❌ Failed to deploy: {}",
                reply.status.as_u16()
            ))?;
            return Err(self.unexpected_status(PUT_DEPLOY, reply));
        }

        let response = self.parse_reply(&reply)?;
        let result = match response.get("result") {
            Some(result) => result,
            None => {
                self.report(format_args!("❌ Deploy failed: {}", response))?;
                return Err(Error::DeployRejected(response));
            }
        };
        let deploy_hash = match result.get("deploy_hash").and_then(Value::as_str) {
            Some(deploy_hash) => deploy_hash.to_string(),
            None => {
                self.report(format_args!("❌ Deploy failed: {}", response))?;
                return Err(Error::MissingField {
                    method: PUT_DEPLOY,
                    field: "result.deploy_hash",
                    response,
                });
            }
        };

        let explorer_url = self.config.explorer.deploy_url(&deploy_hash);
        self.report("✅ Contract deployed successfully!")?;
        self.report(format_args!("🔗 Deploy hash: {}", deploy_hash))?;
        self.report(format_args!("🌐 View on explorer: {}", explorer_url))?;
        info!(%deploy_hash, "deploy accepted");
        Ok(DeployReceipt {
            deploy_hash,
            explorer_url,
        })
    }

    fn parse_reply(&mut self, reply: &RpcReply) -> Result<Value> {
        match reply.json() {
            Ok(response) => Ok(response),
            Err(error) => {
                self.report(format_args!("❌ Invalid response: {}", reply.body))?;
                Err(error)
            }
        }
    }

    fn unexpected_status(&mut self, method: &'static str, reply: RpcReply) -> Error {
        if let Err(error) = self.report(&reply.body) {
            warn!(%error, "unable to report reply body");
        }
        Error::UnexpectedStatus {
            method,
            status: reply.status,
            body: reply.body,
        }
    }

    fn report(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.out, "{}", line).map_err(|error| Error::io("unable to write report", error))
    }

    fn enter(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "deploy stage transition");
        self.stage = stage;
    }

    /// Moves to `Failed` if `result` is an error. A run which already failed keeps its stage.
    fn fail_on_error<V>(&mut self, result: Result<V>) -> Result<V> {
        if let Err(error) = &result {
            let at = match self.stage {
                Stage::LoadingInputs => FailedAt::LoadingInputs,
                Stage::FetchingState => FailedAt::FetchingState,
                Stage::SubmittingDeploy | Stage::Done => FailedAt::SubmittingDeploy,
                Stage::Failed(_) => return result,
            };
            warn!(?at, %error, "deploy run failed");
            self.enter(Stage::Failed(at));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, VecDeque},
        path::{Path, PathBuf},
        sync::{Arc, Mutex},
    };

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    const WASM_PATH: &str = "/contracts/vault.wasm";
    const KEY_PATH: &str = "/keys/secret_key.pem";
    const WASM: &[u8] = b"\0asm\x01\0\0\0";

    type EventLog = Arc<Mutex<Vec<String>>>;

    struct MemoryFiles {
        files: HashMap<PathBuf, Vec<u8>>,
        log: EventLog,
    }

    impl MemoryFiles {
        fn new(log: EventLog) -> Self {
            let mut files = HashMap::new();
            files.insert(PathBuf::from(WASM_PATH), WASM.to_vec());
            files.insert(PathBuf::from(KEY_PATH), b"  MC4CAQAwBQYDK2VwBCIEIGyw\n".to_vec());
            MemoryFiles { files, log }
        }

        fn without(mut self, path: &str) -> Self {
            self.files.remove(Path::new(path));
            self
        }

        fn fetch(&self, path: &Path) -> Result<Vec<u8>> {
            self.log
                .lock()
                .unwrap()
                .push(format!("read {}", path.display()));
            self.files.get(path).cloned().ok_or_else(|| {
                Error::io(
                    format!("unable to read {}", path.display()),
                    std::io::ErrorKind::NotFound.into(),
                )
            })
        }
    }

    impl FileSource for MemoryFiles {
        fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.fetch(path)
        }

        fn read_to_string(&self, path: &Path) -> Result<String> {
            Ok(String::from_utf8(self.fetch(path)?).unwrap())
        }
    }

    /// Replays canned replies in order and records every request.
    #[derive(Clone)]
    struct ScriptedTransport {
        replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
        requests: Arc<Mutex<Vec<RpcRequest>>>,
        log: EventLog,
    }

    impl ScriptedTransport {
        fn new(log: EventLog, replies: Vec<(StatusCode, &str)>) -> Self {
            ScriptedTransport {
                replies: Arc::new(Mutex::new(
                    replies
                        .into_iter()
                        .map(|(status, body)| (status, body.to_string()))
                        .collect(),
                )),
                requests: Arc::new(Mutex::new(vec![])),
                log,
            }
        }

        fn requests(&self) -> Vec<RpcRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn send(&self, request: &RpcRequest) -> Result<RpcReply> {
            self.log
                .lock()
                .unwrap()
                .push(format!("send {}", request.method));
            self.requests.lock().unwrap().push(request.clone());
            let (status, body) = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected request");
            Ok(RpcReply { status, body })
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.deploy.wasm_path = PathBuf::from(WASM_PATH);
        config.deploy.secret_key_path = PathBuf::from(KEY_PATH);
        config
    }

    const STATE_OK: &str = r#"{"jsonrpc":"2.0","id":1,"result":{"state_root_hash":"abc123"}}"#;
    const DEPLOY_OK: &str = r#"{"jsonrpc":"2.0","id":2,"result":{"deploy_hash":"deadbeef"}}"#;

    fn accepting_node() -> Vec<(StatusCode, &'static str)> {
        vec![(StatusCode::OK, STATE_OK), (StatusCode::OK, DEPLOY_OK)]
    }

    struct Harness {
        deployer: Deployer<ScriptedTransport, MemoryFiles, Vec<u8>>,
        transport: ScriptedTransport,
        log: EventLog,
    }

    impl Harness {
        fn new(replies: Vec<(StatusCode, &str)>) -> Self {
            Self::with(test_config(), |files| files, replies)
        }

        fn with(
            config: Config,
            files: impl FnOnce(MemoryFiles) -> MemoryFiles,
            replies: Vec<(StatusCode, &str)>,
        ) -> Self {
            let log = EventLog::default();
            let transport = ScriptedTransport::new(log.clone(), replies);
            let files = files(MemoryFiles::new(log.clone()));
            let deployer = Deployer::new(config, transport.clone(), files, Vec::new());
            Harness {
                deployer,
                transport,
                log,
            }
        }

        fn output(self) -> String {
            String::from_utf8(self.deployer.into_output()).unwrap()
        }
    }

    #[tokio::test]
    async fn should_deploy_and_print_explorer_link() {
        let mut harness = Harness::new(accepting_node());

        let outcome = harness.deployer.run().await.unwrap();

        assert_eq!(
            outcome,
            DeployOutcome {
                state_root_hash: "abc123".to_string(),
                deploy_hash: "deadbeef".to_string(),
                explorer_url: "https://testnet.cspr.cloud/deploy/deadbeef".to_string(),
            }
        );
        assert_eq!(harness.deployer.stage(), Stage::Done);
        let output = harness.output();
        assert!(output.contains("✅ State root hash: abc123"));
        assert!(output.contains("🔗 Deploy hash: deadbeef"));
        assert!(output.contains("https://testnet.cspr.cloud/deploy/deadbeef"));
    }

    #[tokio::test]
    async fn should_read_both_files_before_any_request() {
        let mut harness = Harness::new(accepting_node());

        harness.deployer.run().await.unwrap();

        assert_eq!(
            *harness.log.lock().unwrap(),
            vec![
                format!("read {}", WASM_PATH),
                format!("read {}", KEY_PATH),
                format!("send {}", GET_STATE_ROOT_HASH),
                format!("send {}", PUT_DEPLOY),
            ]
        );
    }

    #[tokio::test]
    async fn should_send_deploy_matching_schema() {
        let mut harness = Harness::new(accepting_node());

        harness.deployer.run().await.unwrap();

        let requests = harness.transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            serde_json::to_value(&requests[0]).unwrap(),
            json!({"jsonrpc": "2.0", "method": "chain_get_state_root_hash", "params": [], "id": 1})
        );

        let put_deploy = serde_json::to_value(&requests[1]).unwrap();
        let timestamp = put_deploy["params"]["deploy"]["header"]["timestamp"].clone();
        assert!(timestamp.is_u64());
        let package_hash = "hash-0000000000000000000000000000000000000000000000000000000000000000";
        assert_eq!(
            put_deploy,
            json!({
                "jsonrpc": "2.0",
                "method": "account_put_deploy",
                "params": {
                    "deploy": {
                        "header": {
                            "account": "MC4CAQAwBQYDK2VwBCIEIGyw",
                            "timestamp": timestamp,
                            "ttl": "30m",
                            "gas_price": 1,
                            "body_hash": "",
                            "dependencies": [],
                            "chain_name": "casper-test"
                        },
                        "payment": {
                            "StoredValue": {
                                "StoredContract": {
                                    "package_hash": package_hash,
                                    "entry_point": "standard_payment",
                                    "args": [{
                                        "cl_type": "U512",
                                        "bytes": "0500e40b5402",
                                        "parsed": "10000000000"
                                    }]
                                }
                            }
                        },
                        "session": {
                            "StoredValue": {
                                "StoredContract": {
                                    "package_hash": package_hash,
                                    "entry_point": "call",
                                    "args": []
                                }
                            }
                        }
                    }
                },
                "id": 2
            })
        );
    }

    #[tokio::test]
    async fn should_stop_after_failed_state_request() {
        let mut harness = Harness::new(vec![(
            StatusCode::SERVICE_UNAVAILABLE,
            "upstream unavailable",
        )]);

        let error = harness.deployer.run().await.unwrap_err();

        assert_matches!(
            error,
            Error::UnexpectedStatus { method: GET_STATE_ROOT_HASH, status, .. }
                if status == StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::FetchingState)
        );
        assert_eq!(harness.transport.requests().len(), 1);
        let output = harness.output();
        assert!(output.contains("❌ Failed to get state: 503"));
        assert!(output.contains("upstream unavailable"));
        assert!(!output.contains("📤 Sending deploy..."));
    }

    #[tokio::test]
    async fn should_stop_on_client_error_too() {
        let mut harness = Harness::new(vec![(StatusCode::UNAUTHORIZED, "bad token")]);

        assert!(harness.deployer.run().await.is_err());
        assert_eq!(harness.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn should_report_rejected_deploy_without_panicking() {
        let mut harness = Harness::new(vec![
            (StatusCode::OK, STATE_OK),
            (StatusCode::OK, r#"{"error":{"message":"bad deploy"}}"#),
        ]);

        let error = harness.deployer.run().await.unwrap_err();

        assert_matches!(&error, Error::DeployRejected(response)
            if response == &json!({"error": {"message": "bad deploy"}}));
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::SubmittingDeploy)
        );
        let output = harness.output();
        assert!(output.contains(r#"❌ Deploy failed: {"error":{"message":"bad deploy"}}"#));
        assert!(!output.contains("deployed successfully"));
    }

    #[tokio::test]
    async fn should_report_http_failure_of_deploy() {
        let mut harness = Harness::new(vec![
            (StatusCode::OK, STATE_OK),
            (StatusCode::INTERNAL_SERVER_ERROR, "boom"),
        ]);

        let error = harness.deployer.run().await.unwrap_err();

        assert_matches!(error, Error::UnexpectedStatus { method: PUT_DEPLOY, .. });
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::SubmittingDeploy)
        );
        let output = harness.output();
        assert!(output.contains("❌ Failed to deploy: 500"));
        assert!(output.contains("boom"));
    }

    #[tokio::test]
    async fn should_fail_on_state_response_without_hash() {
        let mut harness = Harness::new(vec![(StatusCode::OK, r#"{"result":{}}"#)]);

        let error = harness.deployer.run().await.unwrap_err();

        assert_matches!(
            error,
            Error::MissingField { field: "result.state_root_hash", .. }
        );
        assert_eq!(harness.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn should_fail_on_result_without_deploy_hash() {
        let mut harness = Harness::new(vec![
            (StatusCode::OK, STATE_OK),
            (StatusCode::OK, r#"{"result":{"api_version":"1.5.0"}}"#),
        ]);

        let error = harness.deployer.run().await.unwrap_err();

        assert_matches!(error, Error::MissingField { field: "result.deploy_hash", .. });
    }

    #[tokio::test]
    async fn should_fail_on_non_json_reply() {
        let mut harness = Harness::new(vec![(StatusCode::OK, "<html>gateway</html>")]);

        assert_matches!(harness.deployer.run().await, Err(Error::InvalidJson(_)));
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::FetchingState)
        );
        assert!(harness
            .output()
            .contains("❌ Invalid response: <html>gateway</html>"));
    }

    #[tokio::test]
    async fn should_print_non_json_deploy_reply() {
        let mut harness = Harness::new(vec![
            (StatusCode::OK, STATE_OK),
            (StatusCode::OK, "Service Temporarily Unavailable"),
        ]);

        assert_matches!(harness.deployer.run().await, Err(Error::InvalidJson(_)));
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::SubmittingDeploy)
        );
        let output = harness.output();
        assert!(output.contains("❌ Invalid response: Service Temporarily Unavailable"));
        assert!(!output.contains("deployed successfully"));
    }

    #[tokio::test]
    async fn should_keep_first_failure_stage() {
        let mut harness = Harness::new(vec![(StatusCode::BAD_GATEWAY, "bad gateway")]);

        assert!(harness.deployer.run().await.is_err());
        let later: Result<()> = Err(Error::InvalidArgument("later".to_string()));
        assert!(harness.deployer.fail_on_error(later).is_err());

        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::FetchingState)
        );
    }

    #[tokio::test]
    async fn should_not_touch_network_if_key_is_missing() {
        let mut harness = Harness::with(
            test_config(),
            |files| files.without(KEY_PATH),
            vec![(StatusCode::OK, STATE_OK)],
        );

        let error = harness.deployer.run().await.unwrap_err();

        assert_matches!(error, Error::IoError { .. });
        assert!(harness.transport.requests().is_empty());
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::LoadingInputs)
        );
    }

    #[tokio::test]
    async fn should_submit_twice_when_run_twice() {
        let mut harness = Harness::new(vec![
            (StatusCode::OK, STATE_OK),
            (StatusCode::OK, DEPLOY_OK),
            (StatusCode::OK, STATE_OK),
            (StatusCode::OK, DEPLOY_OK),
        ]);

        harness.deployer.run().await.unwrap();
        harness.deployer.run().await.unwrap();

        let methods: Vec<_> = harness
            .transport
            .requests()
            .iter()
            .map(|request| request.method)
            .collect();
        assert_eq!(
            methods,
            vec![GET_STATE_ROOT_HASH, PUT_DEPLOY, GET_STATE_ROOT_HASH, PUT_DEPLOY]
        );
    }

    #[tokio::test]
    async fn should_ship_wasm_as_module_bytes_when_configured() {
        let mut config = test_config();
        config.deploy.session_kind = SessionKind::ModuleBytes;
        let mut harness = Harness::with(config, |files| files, accepting_node());

        harness.deployer.run().await.unwrap();

        let put_deploy = serde_json::to_value(&harness.transport.requests()[1]).unwrap();
        assert_eq!(
            put_deploy["params"]["deploy"]["session"],
            json!({"ModuleBytes": {"module_bytes": hex::encode(WASM), "args": []}})
        );
    }

    #[tokio::test]
    async fn should_fail_while_submitting_on_bad_payment_amount() {
        let mut config = test_config();
        config.deploy.payment_amount = "lots".to_string();
        let mut harness = Harness::with(config, |files| files, vec![(StatusCode::OK, STATE_OK)]);

        assert_matches!(harness.deployer.run().await, Err(Error::InvalidArgument(_)));
        assert_eq!(
            harness.deployer.stage(),
            Stage::Failed(FailedAt::SubmittingDeploy)
        );
        assert_eq!(harness.transport.requests().len(), 1);
    }

    #[test]
    fn should_reject_bad_payment_amount() {
        let mut config = test_config();
        config.deploy.payment_amount = "lots".to_string();
        let harness = Harness::with(config, |files| files, vec![]);
        let inputs = DeployInputs {
            wasm: WASM.to_vec(),
            secret_key: "key".to_string(),
        };

        assert_matches!(
            harness.deployer.build_deploy(&inputs),
            Err(Error::InvalidArgument(_))
        );
    }

    #[test]
    fn should_stamp_deploy_with_given_time() {
        let harness = Harness::new(vec![]);
        let inputs = DeployInputs {
            wasm: WASM.to_vec(),
            secret_key: "key".to_string(),
        };

        let deploy = harness
            .deployer
            .build_deploy_at(&inputs, Timestamp::from(42))
            .unwrap();

        assert_eq!(deploy.header.timestamp, Timestamp::from(42));
        assert_eq!(deploy.header.account, "key");
        assert!(deploy.header.body_hash.is_empty());
    }
}
