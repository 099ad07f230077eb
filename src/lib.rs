//! Client library for the BlackRoad agent platform.
//!
//! [`BlackRoadClient`] resolves its configuration once (explicit options,
//! then `BLACKROAD_*` environment variables, then defaults) and sends every
//! call through a retrying executor that maps non-2xx responses onto
//! [`Error`].
//!
//! ```rust,no_run
//! use blackroad::{BlackRoadClient, ClientOptions, DispatchTaskOptions};
//!
//! # async fn run() -> blackroad::Result<()> {
//! let client = BlackRoadClient::new(ClientOptions::default())?;
//! let task = client
//!     .tasks()
//!     .dispatch(DispatchTaskOptions {
//!         title: "Deploy new feature".to_string(),
//!         priority: Some("high".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("dispatched {}", task.id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod runtime;

pub use api::{
    Agent, AgentListOptions, DispatchTaskOptions, HealthStatus, LogMemoryOptions, MemoryEntry,
    MemoryQueryOptions, Metadata, RegisterAgentOptions, Stats, Task, TaskListOptions,
    VerifyChainResult,
};
pub use client::BlackRoadClient;
pub use config::{ClientConfig, ClientOptions};
pub use error::{Error, ErrorKind, Result};
pub use http::{CallOptions, CancelHandle, CancelSignal, QueryParams, RequestSpec, cancel_pair};
