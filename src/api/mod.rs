//! Typed wrappers over the BlackRoad endpoints.
//!
//! Each facade only knows its endpoint paths and payload shapes; sending,
//! retrying and error mapping all happen in [`crate::http::Executor`].

pub mod agents;
pub mod memory;
pub mod tasks;
pub mod types;

pub use agents::AgentApi;
pub use memory::MemoryApi;
pub use tasks::TaskApi;
pub use types::{
    Agent, AgentListOptions, DispatchTaskOptions, HealthStatus, LogMemoryOptions, MemoryEntry,
    MemoryQueryOptions, Metadata, RegisterAgentOptions, Stats, Task, TaskListOptions,
    VerifyChainResult,
};
