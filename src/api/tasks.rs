use serde::Deserialize;
use serde_json::{Value, json};

use super::types::{DispatchTaskOptions, Stats, Task, TaskListOptions};
use crate::client::BlackRoadClient;
use crate::error::Result;
use crate::http::{QueryParams, path_segment};

const DEFAULT_PRIORITY: &str = "medium";

/// Task dispatch endpoints.
#[derive(Clone)]
pub struct TaskApi {
    client: BlackRoadClient,
}

#[derive(Deserialize)]
struct TasksResponse {
    tasks: Vec<Task>,
}

impl TaskApi {
    pub(crate) fn new(client: BlackRoadClient) -> Self {
        Self { client }
    }

    /// Dispatches a task. Priority defaults to `"medium"`.
    #[tracing::instrument(skip(self, opts), fields(title = %opts.title))]
    pub async fn dispatch(&self, opts: DispatchTaskOptions) -> Result<Task> {
        let body = DispatchTaskOptions {
            priority: Some(
                opts.priority
                    .clone()
                    .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            ),
            ..opts
        };
        self.client.post("/tasks", &body).await
    }

    pub async fn get(&self, task_id: &str) -> Result<Task> {
        self.client
            .get(&task_path(task_id), QueryParams::new())
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, opts: Option<TaskListOptions>) -> Result<Vec<Task>> {
        let mut query = QueryParams::new();
        if let Some(opts) = opts {
            query.insert_opt("status", opts.status);
            query.insert_opt("priority", opts.priority);
            query.insert_opt("division", opts.division);
            query.insert_opt("limit", opts.limit);
            query.insert_opt("offset", opts.offset);
        }

        let response: TasksResponse = self.client.get("/tasks", query).await?;
        Ok(response.tasks)
    }

    pub async fn complete(&self, task_id: &str, result: Option<&str>) -> Result<Task> {
        self.update(task_id, "completed", result).await
    }

    /// Marks a task failed. `reason` is stored as the task's result.
    pub async fn fail(&self, task_id: &str, reason: Option<&str>) -> Result<Task> {
        self.update(task_id, "failed", reason).await
    }

    pub async fn assign(&self, task_id: &str, agent_id: &str) -> Result<Task> {
        let body = json!({
            "assigned_agent": agent_id,
            "status": "assigned",
        });
        self.client.put(&task_path(task_id), &body).await
    }

    pub async fn cancel(&self, task_id: &str) -> Result<()> {
        let _: Value = self.client.delete(&task_path(task_id)).await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.client.get("/tasks/stats", QueryParams::new()).await
    }

    pub async fn pending(&self) -> Result<Vec<Task>> {
        self.list_where(TaskListOptions {
            status: Some("pending".to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn in_progress(&self) -> Result<Vec<Task>> {
        self.list_where(TaskListOptions {
            status: Some("in_progress".to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn by_division(&self, division: &str) -> Result<Vec<Task>> {
        self.list_where(TaskListOptions {
            division: Some(division.to_string()),
            ..Default::default()
        })
        .await
    }

    pub async fn urgent(&self) -> Result<Vec<Task>> {
        self.list_where(TaskListOptions {
            priority: Some("urgent".to_string()),
            ..Default::default()
        })
        .await
    }

    async fn list_where(&self, opts: TaskListOptions) -> Result<Vec<Task>> {
        self.list(Some(opts)).await
    }

    async fn update(&self, task_id: &str, status: &str, result: Option<&str>) -> Result<Task> {
        let mut body = json!({ "status": status });
        if let Some(result) = result {
            body["result"] = Value::String(result.to_string());
        }
        self.client.put(&task_path(task_id), &body).await
    }
}

fn task_path(task_id: &str) -> String {
    format!("/tasks/{}", path_segment(task_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_client;
    use crate::error::Error;
    use mockito::Matcher;

    const TASK_JSON: &str = r#"{
        "id": "t1",
        "title": "Deploy",
        "status": "pending",
        "priority": "medium",
        "created_at": "2026-01-02T03:04:05Z",
        "updated_at": "2026-01-02T03:04:05Z"
    }"#;

    #[tokio::test]
    async fn test_dispatch_defaults_priority() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tasks")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "title": "Deploy",
                "priority": "medium"
            })))
            .with_status(201)
            .with_body(TASK_JSON)
            .create_async()
            .await;

        let task = test_client(&server.url(), 3)
            .tasks()
            .dispatch(DispatchTaskOptions {
                title: "Deploy".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(task.id, "t1");
        assert_eq!(task.priority, "medium");
    }

    #[tokio::test]
    async fn test_dispatch_keeps_explicit_priority() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tasks")
            .match_body(Matcher::PartialJson(serde_json::json!({"priority": "urgent"})))
            .with_status(201)
            .with_body(TASK_JSON)
            .create_async()
            .await;

        test_client(&server.url(), 3)
            .tasks()
            .dispatch(DispatchTaskOptions {
                title: "Deploy".to_string(),
                priority: Some("urgent".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_query_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tasks?status=pending&division=Ops&limit=5")
            .with_status(200)
            .with_body(format!(r#"{{"tasks":[{}]}}"#, TASK_JSON))
            .create_async()
            .await;

        let tasks = test_client(&server.url(), 3)
            .tasks()
            .list(Some(TaskListOptions {
                status: Some("pending".to_string()),
                division: Some("Ops".to_string()),
                limit: Some(5),
                ..Default::default()
            }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_complete_sends_result() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/tasks/t1")
            .match_body(Matcher::Json(serde_json::json!({
                "status": "completed",
                "result": "Deployed successfully"
            })))
            .with_status(200)
            .with_body(TASK_JSON)
            .create_async()
            .await;

        test_client(&server.url(), 3)
            .tasks()
            .complete("t1", Some("Deployed successfully"))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fail_without_reason() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/tasks/t1")
            .match_body(Matcher::Json(serde_json::json!({"status": "failed"})))
            .with_status(200)
            .with_body(TASK_JSON)
            .create_async()
            .await;

        test_client(&server.url(), 3)
            .tasks()
            .fail("t1", None)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_assign() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/tasks/t1")
            .match_body(Matcher::Json(serde_json::json!({
                "assigned_agent": "a1",
                "status": "assigned"
            })))
            .with_status(200)
            .with_body(TASK_JSON)
            .create_async()
            .await;

        test_client(&server.url(), 3)
            .tasks()
            .assign("t1", "a1")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_urgent_filters_priority() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tasks?priority=urgent")
            .with_status(200)
            .with_body(r#"{"tasks":[]}"#)
            .create_async()
            .await;

        let tasks = test_client(&server.url(), 3).tasks().urgent().await.unwrap();

        mock.assert_async().await;
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_validation_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/tasks/t1")
            .with_status(422)
            .with_body("task already completed")
            .expect(1)
            .create_async()
            .await;

        let err = test_client(&server.url(), 3)
            .tasks()
            .cancel("t1")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err,
            Error::Validation("task already completed".to_string())
        );
    }
}
