//! The BlackRoad API client.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::api::{AgentApi, HealthStatus, MemoryApi, TaskApi};
use crate::config::{ClientConfig, ClientOptions};
use crate::error::Result;
use crate::http::{
    CallOptions, Executor, QueryParams, RequestSpec, ReqwestTransport, Transport, decode_json,
};
use crate::runtime::{RealRuntime, Runtime};

/// Client for the BlackRoad API.
///
/// Cloning is cheap; clones share the transport and configuration.
///
/// ```rust,no_run
/// use blackroad::{BlackRoadClient, ClientOptions};
///
/// # async fn run() -> blackroad::Result<()> {
/// let client = BlackRoadClient::new(ClientOptions::with_api_key("your-api-key"))?;
/// let agents = client.agents().list(None).await?;
/// println!("Found {} agents", agents.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlackRoadClient {
    executor: Executor,
}

impl BlackRoadClient {
    /// Creates a client, falling back to `BLACKROAD_*` environment variables
    /// for anything `options` leaves unset.
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_runtime(options, Arc::new(RealRuntime))
    }

    /// Like [`BlackRoadClient::new`], with environment reads and backoff sleeps
    /// going through `runtime`.
    pub fn with_runtime(options: ClientOptions, runtime: Arc<dyn Runtime>) -> Result<Self> {
        let config = ClientConfig::resolve(options, runtime.as_ref())?;
        let transport = ReqwestTransport::new()?;
        Ok(Self::from_parts(config, Arc::new(transport), runtime))
    }

    pub fn from_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        runtime: Arc<dyn Runtime>,
    ) -> Self {
        Self {
            executor: Executor::new(config, transport, runtime),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    pub fn agents(&self) -> AgentApi {
        AgentApi::new(self.clone())
    }

    pub fn tasks(&self) -> TaskApi {
        TaskApi::new(self.clone())
    }

    pub fn memory(&self) -> MemoryApi {
        MemoryApi::new(self.clone())
    }

    /// Executes `spec` and decodes the JSON response.
    pub async fn execute<T: DeserializeOwned>(&self, spec: &RequestSpec) -> Result<T> {
        self.execute_with(spec, &CallOptions::default()).await
    }

    /// Executes `spec` under a deadline and/or cancel signal.
    pub async fn execute_with<T: DeserializeOwned>(
        &self,
        spec: &RequestSpec,
        options: &CallOptions,
    ) -> Result<T> {
        let body = self.executor.execute(spec, options).await?;
        decode_json(&body)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, query: QueryParams) -> Result<T> {
        self.execute(&RequestSpec::get(path).with_query(query)).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(&RequestSpec::post(path).with_json(body)?).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.execute(&RequestSpec::put(path).with_json(body)?).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(&RequestSpec::delete(path)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health", QueryParams::new()).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn version(&self) -> Result<String> {
        #[derive(serde::Deserialize)]
        struct VersionResponse {
            version: String,
        }
        let response: VersionResponse = self.get("/version", QueryParams::new()).await?;
        Ok(response.version)
    }
}
