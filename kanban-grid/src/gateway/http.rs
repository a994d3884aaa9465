//! REST gateway over reqwest.
//!
//! Fetches are retried immediately, without backoff, up to the configured
//! number of attempts. Mutating calls are sent exactly once; a failure is
//! reported to the caller and never replayed.

use super::PersistenceGateway;
use crate::config::BoardConfig;
use crate::error::{KanbanError, Result};
use crate::types::{Column, ColumnId, Row, RowId, Task, TaskId, UserId, UserWipStatus};
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
    retry_attempts: u32,
}

impl HttpGateway {
    pub fn new(config: &BoardConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("kanban-grid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KanbanError::Transport {
                url: config.api_base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base: config.base_url()?,
            retry_attempts: config.retry_attempts,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with the given path segments appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| KanbanError::invalid_value("api_base_url", "cannot be a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET with immediate retry on transport errors and retryable statuses
    #[instrument(skip(self, url), fields(url = %url))]
    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            match self.client.get(url.clone()).send().await {
                Ok(response) if is_retryable(response.status().as_u16()) => {
                    let error = rejection(response).await;
                    warn!(attempt, %error, "fetch failed, retrying");
                    last_error = Some(error);
                }
                Ok(response) => return decode(response).await,
                Err(e) => {
                    warn!(attempt, error = %e, "fetch failed, retrying");
                    last_error = Some(transport_error(&url, e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| KanbanError::Transport {
            url: url.to_string(),
            message: "no attempts made".to_string(),
        }))
    }

    /// Single-shot request with an optional JSON body
    #[instrument(skip(self, method, url, body), fields(method = %method, url = %url))]
    async fn send<B: Serialize + Sync>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Response> {
        let mut request = self.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| transport_error(&url, e))?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        debug!(status = response.status().as_u16(), "request succeeded");
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, method: Method, url: Url, body: Value) -> Result<T> {
        let response = self.send(method, url, Some(&body)).await?;
        decode(response).await
    }
}

fn is_retryable(status: u16) -> bool {
    status >= 500 || status == HTTP_TOO_MANY_REQUESTS
}

fn transport_error(url: &Url, error: reqwest::Error) -> KanbanError {
    KanbanError::Transport {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// Read a success body as `T`; an unreadable body is reported as such so
/// callers can tell the request itself went through
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(rejection(response).await);
    }
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let unreadable = |message: String| KanbanError::UnreadableResponse {
        status,
        url: url.clone(),
        message,
    };
    let body = response.text().await.map_err(|e| unreadable(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| unreadable(e.to_string()))
}

/// Turn an error response into a rejection carrying the server's own message
async fn rejection(response: Response) -> KanbanError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    KanbanError::rejected(status.as_u16(), message)
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn move_task_to_column(&self, task_id: &TaskId, column_id: &ColumnId) -> Result<Task> {
        let url = self.endpoint(&["tasks", task_id.as_str(), "column"])?;
        self.send_json(Method::PUT, url, json!({ "columnId": column_id }))
            .await
    }

    async fn move_task_to_row(&self, task_id: &TaskId, row_id: Option<&RowId>) -> Result<Task> {
        let url = self.endpoint(&["tasks", task_id.as_str(), "row"])?;
        self.send_json(Method::PUT, url, json!({ "rowId": row_id }))
            .await
    }

    async fn reorder_task_position(&self, task_id: &TaskId, position: u32) -> Result<Task> {
        let url = self.endpoint(&["tasks", task_id.as_str(), "position"])?;
        self.send_json(Method::PUT, url, json!({ "position": position }))
            .await
    }

    async fn reorder_column_position(&self, column_id: &ColumnId, position: u32) -> Result<Column> {
        let url = self.endpoint(&["columns", column_id.as_str(), "position"])?;
        self.send_json(Method::PUT, url, json!({ "position": position }))
            .await
    }

    async fn reorder_row_position(&self, row_id: &RowId, position: u32) -> Result<Row> {
        let url = self.endpoint(&["rows", row_id.as_str(), "position"])?;
        self.send_json(Method::PUT, url, json!({ "position": position }))
            .await
    }

    async fn check_user_wip_status(&self, user_id: &UserId) -> Result<UserWipStatus> {
        let url = self.endpoint(&["users", user_id.as_str(), "wip-status"])?;
        self.fetch(url).await
    }

    async fn assign_user_to_task(&self, task_id: &TaskId, user_id: &UserId) -> Result<Task> {
        let url = self.endpoint(&["tasks", task_id.as_str(), "users"])?;
        self.send_json(Method::POST, url, json!({ "userId": user_id }))
            .await
    }

    async fn delete_row(&self, row_id: &RowId, cascade: bool) -> Result<()> {
        let mut url = self.endpoint(&["rows", row_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("cascade", if cascade { "true" } else { "false" });
        self.send::<Value>(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn delete_column(&self, column_id: &ColumnId, reassign_to: &ColumnId) -> Result<()> {
        let mut url = self.endpoint(&["columns", column_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("reassignTo", reassign_to.as_str());
        self.send::<Value>(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn fetch_columns(&self) -> Result<Vec<Column>> {
        let url = self.endpoint(&["columns"])?;
        self.fetch(url).await
    }

    async fn fetch_rows(&self) -> Result<Vec<Row>> {
        let url = self.endpoint(&["rows"])?;
        self.fetch(url).await
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>> {
        let url = self.endpoint(&["tasks"])?;
        self.fetch(url).await
    }
}
