use anyhow::Result;
use serde_json::{Value, json};

use super::{parse_metadata, to_json};
use crate::api::{AgentListOptions, Metadata, RegisterAgentOptions};
use crate::client::BlackRoadClient;

#[derive(clap::Subcommand, Debug)]
pub enum AgentCommand {
    /// List agents
    List {
        /// Filter by agent type
        #[arg(long = "type", value_name = "TYPE")]
        agent_type: Option<String>,
        #[arg(long)]
        division: Option<String>,
        #[arg(long)]
        level: Option<i32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show one agent
    Get { id: String },

    /// Register a new agent
    Register {
        name: String,
        /// Agent type (defaults to "ai")
        #[arg(long = "type", value_name = "TYPE")]
        agent_type: Option<String>,
        #[arg(long)]
        division: Option<String>,
        /// Hierarchy level (defaults to 4)
        #[arg(long)]
        level: Option<i32>,
        /// Extra metadata as a JSON object
        #[arg(long, value_parser = parse_metadata)]
        metadata: Option<Metadata>,
    },

    /// Send a heartbeat for an agent
    Heartbeat {
        id: String,
        /// Current load, 0.0 to 1.0
        #[arg(long)]
        load: Option<f64>,
    },

    /// Set an agent's status
    Status { id: String, status: String },

    /// Remove an agent
    Delete { id: String },

    /// Show agent statistics
    Stats,
}

pub(super) async fn execute(client: &BlackRoadClient, command: AgentCommand) -> Result<Value> {
    let agents = client.agents();
    match command {
        AgentCommand::List {
            agent_type,
            division,
            level,
            status,
            limit,
            offset,
        } => {
            let opts = AgentListOptions {
                agent_type,
                division,
                level,
                status,
                limit,
                offset,
            };
            to_json(agents.list(Some(opts)).await?)
        }
        AgentCommand::Get { id } => to_json(agents.get(&id).await?),
        AgentCommand::Register {
            name,
            agent_type,
            division,
            level,
            metadata,
        } => {
            let opts = RegisterAgentOptions {
                name,
                agent_type,
                division,
                level,
                metadata,
            };
            to_json(agents.register(opts).await?)
        }
        AgentCommand::Heartbeat { id, load } => {
            agents.heartbeat(&id, load).await?;
            Ok(json!({ "id": id, "heartbeat": "ok" }))
        }
        AgentCommand::Status { id, status } => to_json(agents.update_status(&id, &status).await?),
        AgentCommand::Delete { id } => {
            agents.delete(&id).await?;
            Ok(json!({ "id": id, "deleted": true }))
        }
        AgentCommand::Stats => to_json(agents.stats().await?),
    }
}
