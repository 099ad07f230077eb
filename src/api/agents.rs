use serde::Deserialize;
use serde_json::json;

use super::types::{Agent, AgentListOptions, RegisterAgentOptions, Stats};
use crate::client::BlackRoadClient;
use crate::error::Result;
use crate::http::{QueryParams, path_segment};

const DEFAULT_AGENT_TYPE: &str = "ai";
const DEFAULT_AGENT_LEVEL: i32 = 4;

/// Agent registry endpoints.
#[derive(Clone)]
pub struct AgentApi {
    client: BlackRoadClient,
}

#[derive(Deserialize)]
struct AgentsResponse {
    agents: Vec<Agent>,
}

impl AgentApi {
    pub(crate) fn new(client: BlackRoadClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, opts: Option<AgentListOptions>) -> Result<Vec<Agent>> {
        let mut query = QueryParams::new();
        if let Some(opts) = opts {
            query.insert_opt("type", opts.agent_type);
            query.insert_opt("division", opts.division);
            query.insert_opt("level", opts.level);
            query.insert_opt("status", opts.status);
            query.insert_opt("limit", opts.limit);
            query.insert_opt("offset", opts.offset);
        }

        let response: AgentsResponse = self.client.get("/agents", query).await?;
        Ok(response.agents)
    }

    pub async fn get(&self, agent_id: &str) -> Result<Agent> {
        self.client
            .get(&agent_path(agent_id), QueryParams::new())
            .await
    }

    /// Registers an agent. Type defaults to `"ai"` and level to 4.
    #[tracing::instrument(skip(self, opts), fields(name = %opts.name))]
    pub async fn register(&self, opts: RegisterAgentOptions) -> Result<Agent> {
        let body = RegisterAgentOptions {
            agent_type: Some(
                opts.agent_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AGENT_TYPE.to_string()),
            ),
            level: Some(opts.level.unwrap_or(DEFAULT_AGENT_LEVEL)),
            ..opts
        };
        self.client.post("/agents", &body).await
    }

    pub async fn heartbeat(&self, agent_id: &str, load: Option<f64>) -> Result<()> {
        let body = match load {
            Some(load) => json!({ "load": load }),
            None => json!({}),
        };
        let _: serde_json::Value = self
            .client
            .post(&format!("{}/heartbeat", agent_path(agent_id)), &body)
            .await?;
        Ok(())
    }

    pub async fn update_status(&self, agent_id: &str, status: &str) -> Result<Agent> {
        self.client
            .put(&agent_path(agent_id), &json!({ "status": status }))
            .await
    }

    pub async fn delete(&self, agent_id: &str) -> Result<()> {
        let _: serde_json::Value = self.client.delete(&agent_path(agent_id)).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.client.get("/agents/stats", QueryParams::new()).await
    }

    pub async fn by_division(&self, division: &str) -> Result<Vec<Agent>> {
        self.list(Some(AgentListOptions {
            division: Some(division.to_string()),
            ..Default::default()
        }))
        .await
    }

    /// Level 2 agents.
    pub async fn commanders(&self) -> Result<Vec<Agent>> {
        self.by_level(2).await
    }

    /// Level 3 agents.
    pub async fn managers(&self) -> Result<Vec<Agent>> {
        self.by_level(3).await
    }

    /// Level 4 agents.
    pub async fn workers(&self) -> Result<Vec<Agent>> {
        self.by_level(4).await
    }

    async fn by_level(&self, level: i32) -> Result<Vec<Agent>> {
        self.list(Some(AgentListOptions {
            level: Some(level),
            ..Default::default()
        }))
        .await
    }
}

fn agent_path(agent_id: &str) -> String {
    format!("/agents/{}", path_segment(agent_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use crate::error::Error;
    use mockito::Matcher;

    const AGENT_JSON: &str = r#"{
        "id": "a1",
        "name": "cecilia",
        "type": "ai",
        "division": "Security",
        "level": 2,
        "status": "active",
        "load": 0.25,
        "created_at": "2026-01-02T03:04:05Z"
    }"#;

    #[tokio::test]
    async fn test_list_with_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/agents?division=Security&level=2&limit=10")
            .with_status(200)
            .with_body(format!(r#"{{"agents":[{}]}}"#, AGENT_JSON))
            .create_async()
            .await;

        let agents = test_client(&server.url(), 3)
            .agents()
            .list(Some(AgentListOptions {
                division: Some("Security".to_string()),
                level: Some(2),
                limit: Some(10),
                ..Default::default()
            }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].agent_type, "ai");
        assert_eq!(agents[0].division.as_deref(), Some("Security"));
    }

    #[tokio::test]
    async fn test_commanders_filters_level_two() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/agents")
            .match_query(Matcher::UrlEncoded("level".into(), "2".into()))
            .with_status(200)
            .with_body(r#"{"agents":[]}"#)
            .create_async()
            .await;

        let agents = test_client(&server.url(), 3)
            .agents()
            .commanders()
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(agents.is_empty());
    }

    #[tokio::test]
    async fn test_register_applies_defaults() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/agents")
            .match_body(Matcher::Json(serde_json::json!({
                "name": "cecilia",
                "type": "ai",
                "level": 4
            })))
            .with_status(201)
            .with_body(AGENT_JSON)
            .create_async()
            .await;

        let agent = test_client(&server.url(), 3)
            .agents()
            .register(RegisterAgentOptions {
                name: "cecilia".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(agent.id, "a1");
    }

    #[tokio::test]
    async fn test_heartbeat_sends_load() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/agents/a1/heartbeat")
            .match_body(Matcher::Json(serde_json::json!({"load": 0.5})))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        test_client(&server.url(), 3)
            .agents()
            .heartbeat("a1", Some(0.5))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/agents/ghost")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let err = test_client(&server.url(), 3)
            .agents()
            .get("ghost")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err, Error::NotFound("/agents/ghost".to_string()));
    }

    #[tokio::test]
    async fn test_get_escapes_agent_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/agents/ops%2Fa1%3Fx")
            .with_status(200)
            .with_body(AGENT_JSON)
            .create_async()
            .await;

        test_client(&server.url(), 1)
            .agents()
            .get("ops/a1?x")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/agents/a1")
            .with_status(204)
            .create_async()
            .await;

        test_client(&server.url(), 3)
            .agents()
            .delete("a1")
            .await
            .unwrap();

        mock.assert_async().await;
    }
}
