use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::api::Metadata;
use crate::client::BlackRoadClient;

mod agents;
mod memory;
mod tasks;

pub use agents::AgentCommand;
pub use memory::MemoryCommand;
pub use tasks::TaskCommand;

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Check API health
    Health,

    /// Print the API version
    Version,

    /// Manage agents
    #[command(subcommand)]
    Agents(AgentCommand),

    /// Dispatch and track tasks
    #[command(subcommand)]
    Tasks(TaskCommand),

    /// Read and write the memory log
    #[command(subcommand)]
    Memory(MemoryCommand),
}

/// Runs `command` and prints its result as pretty JSON.
#[tracing::instrument(skip(client))]
pub async fn run(client: &BlackRoadClient, command: Command) -> Result<()> {
    let output = execute(client, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Runs `command` and returns what would be printed.
pub async fn execute(client: &BlackRoadClient, command: Command) -> Result<Value> {
    debug!("Running {:?}", command);
    match command {
        Command::Health => to_json(client.health().await?),
        Command::Version => Ok(serde_json::json!({ "version": client.version().await? })),
        Command::Agents(cmd) => agents::execute(client, cmd).await,
        Command::Tasks(cmd) => tasks::execute(client, cmd).await,
        Command::Memory(cmd) => memory::execute(client, cmd).await,
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to render result as JSON")
}

/// Parses a `--metadata` argument. Must be a JSON object.
fn parse_metadata(raw: &str) -> std::result::Result<Metadata, String> {
    serde_json::from_str(raw).map_err(|e| format!("expected a JSON object: {}", e))
}
