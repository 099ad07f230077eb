use anyhow::Result;
use serde_json::{Value, json};

use super::{parse_metadata, to_json};
use crate::api::{DispatchTaskOptions, Metadata, TaskListOptions};
use crate::client::BlackRoadClient;

#[derive(clap::Subcommand, Debug)]
pub enum TaskCommand {
    /// Dispatch a new task
    Dispatch {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// urgent, high, medium or low (defaults to medium)
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        division: Option<String>,
        #[arg(long)]
        target_level: Option<i32>,
        /// Extra metadata as a JSON object
        #[arg(long, value_parser = parse_metadata)]
        metadata: Option<Metadata>,
    },

    /// Show one task
    Get { id: String },

    /// List tasks
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        division: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Mark a task completed
    Complete {
        id: String,
        #[arg(long)]
        result: Option<String>,
    },

    /// Mark a task failed
    Fail {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Assign a task to an agent
    Assign { id: String, agent: String },

    /// Cancel a task
    Cancel { id: String },

    /// Show task statistics
    Stats,
}

pub(super) async fn execute(client: &BlackRoadClient, command: TaskCommand) -> Result<Value> {
    let tasks = client.tasks();
    match command {
        TaskCommand::Dispatch {
            title,
            description,
            priority,
            division,
            target_level,
            metadata,
        } => {
            let opts = DispatchTaskOptions {
                title,
                description,
                priority,
                division,
                target_level,
                metadata,
            };
            to_json(tasks.dispatch(opts).await?)
        }
        TaskCommand::Get { id } => to_json(tasks.get(&id).await?),
        TaskCommand::List {
            status,
            priority,
            division,
            limit,
            offset,
        } => {
            let opts = TaskListOptions {
                status,
                priority,
                division,
                limit,
                offset,
            };
            to_json(tasks.list(Some(opts)).await?)
        }
        TaskCommand::Complete { id, result } => {
            to_json(tasks.complete(&id, result.as_deref()).await?)
        }
        TaskCommand::Fail { id, reason } => to_json(tasks.fail(&id, reason.as_deref()).await?),
        TaskCommand::Assign { id, agent } => to_json(tasks.assign(&id, &agent).await?),
        TaskCommand::Cancel { id } => {
            tasks.cancel(&id).await?;
            Ok(json!({ "id": id, "cancelled": true }))
        }
        TaskCommand::Stats => to_json(tasks.stats().await?),
    }
}
