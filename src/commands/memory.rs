use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{parse_metadata, to_json};
use crate::api::{LogMemoryOptions, MemoryQueryOptions, Metadata};
use crate::client::BlackRoadClient;

#[derive(clap::Subcommand, Debug)]
pub enum MemoryCommand {
    /// Append an entry to the memory log
    Log {
        action: String,
        entity: String,
        #[arg(long)]
        details: Option<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Extra metadata as a JSON object
        #[arg(long, value_parser = parse_metadata)]
        metadata: Option<Metadata>,
    },

    /// Search the memory log
    Query {
        /// Full-text search
        #[arg(long = "search", short = 'q')]
        search: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        entity: Option<String>,
        /// Comma-separated tags, any of which may match
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// RFC 3339 timestamp
        #[arg(long)]
        since: Option<DateTime<Utc>>,
        /// RFC 3339 timestamp
        #[arg(long)]
        until: Option<DateTime<Utc>>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one entry by hash
    Get { hash: String },

    /// Show the newest entries
    Recent {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Share a "today I learned" entry
    Til { category: String, learning: String },

    /// Show memory statistics
    Stats,

    /// Ask the server to verify the hash chain
    Verify {
        /// Hash to start verifying from
        #[arg(long)]
        start: Option<String>,
    },
}

pub(super) async fn execute(client: &BlackRoadClient, command: MemoryCommand) -> Result<Value> {
    let memory = client.memory();
    match command {
        MemoryCommand::Log {
            action,
            entity,
            details,
            tags,
            metadata,
        } => {
            let opts = LogMemoryOptions {
                action,
                entity,
                details,
                tags: non_empty(tags),
                metadata,
            };
            to_json(memory.log(opts).await?)
        }
        MemoryCommand::Query {
            search,
            action,
            entity,
            tags,
            since,
            until,
            limit,
            offset,
        } => {
            let opts = MemoryQueryOptions {
                search,
                action,
                entity,
                tags: non_empty(tags),
                since,
                until,
                limit,
                offset,
            };
            to_json(memory.query(Some(opts)).await?)
        }
        MemoryCommand::Get { hash } => to_json(memory.get(&hash).await?),
        MemoryCommand::Recent { limit } => to_json(memory.recent(limit).await?),
        MemoryCommand::Til { category, learning } => {
            to_json(memory.til(&category, &learning).await?)
        }
        MemoryCommand::Stats => to_json(memory.stats().await?),
        MemoryCommand::Verify { start } => to_json(memory.verify_chain(start.as_deref()).await?),
    }
}

fn non_empty(tags: Vec<String>) -> Option<Vec<String>> {
    if tags.is_empty() { None } else { Some(tags) }
}
