use anyhow::Result;
use blackroad::{BlackRoadClient, ClientOptions, commands::Command};
use clap::Parser;
use std::time::Duration;

/// blackroad - command line client for the BlackRoad API
///
/// Credentials and endpoint fall back to BLACKROAD_API_KEY and
/// BLACKROAD_API_URL when not given as flags. Results are printed as JSON.
///
/// Examples:
///   blackroad health
///   blackroad agents list --division Security
///   blackroad tasks dispatch "Deploy new feature" --priority high
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API key (overrides BLACKROAD_API_KEY)
    #[arg(long = "api-key", value_name = "KEY", global = true)]
    pub api_key: Option<String>,

    /// API base URL (overrides BLACKROAD_API_URL)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Maximum send attempts per call
    #[arg(long = "max-attempts", value_name = "N", global = true)]
    pub max_attempts: Option<u32>,
}

impl Cli {
    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_key: self.api_key.clone(),
            base_url: self.api_url.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            max_attempts: self.max_attempts,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let client = BlackRoadClient::new(cli.client_options())?;
    blackroad::commands::run(&client, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackroad::commands::{AgentCommand, MemoryCommand, TaskCommand};
    use clap::Parser;

    #[test]
    fn test_cli_health_parsing() {
        let cli = Cli::try_parse_from(["blackroad", "health"]).unwrap();
        assert!(matches!(cli.command, Command::Health));
        assert_eq!(cli.api_key, None);
        assert_eq!(cli.api_url, None);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "blackroad",
            "agents",
            "get",
            "a1",
            "--api-key",
            "k",
            "--timeout",
            "5",
            "--max-attempts",
            "1",
        ])
        .unwrap();

        match cli.command {
            Command::Agents(AgentCommand::Get { ref id }) => assert_eq!(id, "a1"),
            _ => panic!("Expected agents get command"),
        }
        let options = cli.client_options();
        assert_eq!(options.api_key.as_deref(), Some("k"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_attempts, Some(1));
    }

    #[test]
    fn test_cli_tasks_dispatch_parsing() {
        let cli = Cli::try_parse_from([
            "blackroad",
            "--api-url",
            "http://localhost:8080",
            "tasks",
            "dispatch",
            "Deploy",
            "--priority",
            "urgent",
        ])
        .unwrap();

        match cli.command {
            Command::Tasks(TaskCommand::Dispatch {
                title, priority, ..
            }) => {
                assert_eq!(title, "Deploy");
                assert_eq!(priority.as_deref(), Some("urgent"));
            }
            _ => panic!("Expected tasks dispatch command"),
        }
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_cli_memory_query_tags() {
        let cli = Cli::try_parse_from([
            "blackroad",
            "memory",
            "query",
            "--tags",
            "infra,prod",
            "--since",
            "2026-01-01T00:00:00Z",
        ])
        .unwrap();

        match cli.command {
            Command::Memory(MemoryCommand::Query { tags, since, .. }) => {
                assert_eq!(tags, vec!["infra", "prod"]);
                assert!(since.is_some());
            }
            _ => panic!("Expected memory query command"),
        }
    }

    #[test]
    fn test_cli_invalid_metadata_fails() {
        let result = Cli::try_parse_from([
            "blackroad",
            "agents",
            "register",
            "cecilia",
            "--metadata",
            "not-json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["blackroad"]);
        assert!(result.is_err());
    }
}
