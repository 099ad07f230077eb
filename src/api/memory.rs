//! The append-only memory log.
//!
//! Entries are hash-chained server side. [`MemoryApi::verify_chain`] only
//! forwards the request; nothing here recomputes hashes.

use serde::Deserialize;
use serde_json::{Value, json};

use super::types::{
    LogMemoryOptions, MemoryEntry, MemoryQueryOptions, Metadata, Stats, VerifyChainResult,
};
use crate::client::BlackRoadClient;
use crate::error::Result;
use crate::http::{QueryParams, path_segment};

const DEFAULT_QUERY_LIMIT: u32 = 100;
const DEFAULT_RECENT_LIMIT: u32 = 50;

/// Memory log endpoints.
#[derive(Clone)]
pub struct MemoryApi {
    client: BlackRoadClient,
}

#[derive(Deserialize)]
struct EntriesResponse {
    entries: Vec<MemoryEntry>,
}

#[derive(Deserialize)]
struct BroadcastResponse {
    broadcast_id: String,
}

impl MemoryApi {
    pub(crate) fn new(client: BlackRoadClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self, opts), fields(action = %opts.action, entity = %opts.entity))]
    pub async fn log(&self, opts: LogMemoryOptions) -> Result<MemoryEntry> {
        self.client.post("/memory", &opts).await
    }

    /// Queries entries. At most 100 are returned unless `opts.limit` says
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn query(&self, opts: Option<MemoryQueryOptions>) -> Result<Vec<MemoryEntry>> {
        let response: EntriesResponse = self
            .client
            .get("/memory", query_params(opts.unwrap_or_default()))
            .await?;
        Ok(response.entries)
    }

    pub async fn get(&self, entry_hash: &str) -> Result<MemoryEntry> {
        let path = format!("/memory/{}", path_segment(entry_hash));
        self.client.get(&path, QueryParams::new()).await
    }

    /// The newest entries, 50 by default.
    pub async fn recent(&self, limit: Option<u32>) -> Result<Vec<MemoryEntry>> {
        self.query(Some(MemoryQueryOptions {
            limit: Some(limit.unwrap_or(DEFAULT_RECENT_LIMIT)),
            ..Default::default()
        }))
        .await
    }

    pub async fn agent_state(&self, agent_id: &str) -> Result<Metadata> {
        self.client
            .get(&agent_state_path(agent_id), QueryParams::new())
            .await
    }

    pub async fn sync_state(&self, agent_id: &str, state: &Metadata) -> Result<()> {
        let _: Value = self.client.post(&agent_state_path(agent_id), state).await?;
        Ok(())
    }

    /// Broadcasts a message to all agents and returns the broadcast id.
    pub async fn broadcast(&self, message_type: &str, payload: &str) -> Result<String> {
        let body = json!({
            "type": message_type,
            "payload": payload,
        });
        let response: BroadcastResponse = self.client.post("/memory/broadcast", &body).await?;
        Ok(response.broadcast_id)
    }

    /// Logs a "today I learned" entry under `category`.
    pub async fn til(&self, category: &str, learning: &str) -> Result<MemoryEntry> {
        self.log(LogMemoryOptions {
            action: "til".to_string(),
            entity: category.to_string(),
            details: Some(learning.to_string()),
            tags: Some(vec!["til".to_string(), category.to_string()]),
            metadata: None,
        })
        .await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.client.get("/memory/stats", QueryParams::new()).await
    }

    pub async fn verify_chain(&self, start_hash: Option<&str>) -> Result<VerifyChainResult> {
        let mut query = QueryParams::new();
        query.insert_opt("start", start_hash);
        self.client.get("/memory/verify", query).await
    }
}

fn agent_state_path(agent_id: &str) -> String {
    format!("/memory/agents/{}/state", path_segment(agent_id))
}

fn query_params(opts: MemoryQueryOptions) -> QueryParams {
    let mut query = QueryParams::new();
    query.insert("limit", DEFAULT_QUERY_LIMIT);
    query.insert_opt("q", opts.search);
    query.insert_opt("action", opts.action);
    query.insert_opt("entity", opts.entity);
    query.insert_opt("tags", opts.tags.map(|tags| tags.join(",")));
    query.insert_opt("since", opts.since.map(|t| t.to_rfc3339()));
    query.insert_opt("until", opts.until.map(|t| t.to_rfc3339()));
    // Replaces the default in place, so limit stays first.
    query.insert_opt("limit", opts.limit);
    query.insert_opt("offset", opts.offset);
    query
}
