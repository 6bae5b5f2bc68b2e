//! HTTP implementation of the remote collection
//!
//! Talks JSON to a REST endpoint:
//! - `GET    {base}/todos?userId={user}`
//! - `POST   {base}/todos`
//! - `DELETE {base}/todos/{id}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::RemoteCollection;
use crate::error::{RemoteError, RemoteResult};
use crate::models::{NewTodo, Todo, TodoId, UserId};

/// Default collection endpoint
pub const DEFAULT_API_URL: &str = "https://mate.academy/students-api";

/// Remote collection reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpCollection {
    client: Client,
    base_url: String,
    user_id: UserId,
}

impl HttpCollection {
    /// Create a client for the given endpoint and owner
    pub fn new(base_url: &str, user_id: UserId, timeout: Duration) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tasklist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl RemoteCollection for HttpCollection {
    async fn list(&self) -> RemoteResult<Vec<Todo>> {
        let url = self.url("todos");
        debug!("GET {} userId={}", url, self.user_id);

        let response = self
            .client
            .get(&url)
            .query(&[("userId", self.user_id.0)])
            .send()
            .await?;

        decode(ensure_success(response)?).await
    }

    async fn create(&self, todo: &NewTodo) -> RemoteResult<Todo> {
        let url = self.url("todos");
        debug!("POST {} title={:?}", url, todo.title);

        let response = self.client.post(&url).json(todo).send().await?;

        decode(ensure_success(response)?).await
    }

    async fn delete(&self, id: TodoId) -> RemoteResult<()> {
        let url = self.url(&format!("todos/{}", id));
        debug!("DELETE {}", url);

        let response = self.client.delete(&url).send().await?;
        ensure_success(response)?;
        Ok(())
    }
}

/// Turn a non-2xx response into an error
fn ensure_success(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    warn!("{} returned {}", url, status);
    Err(RemoteError::Status { status, url })
}

async fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}
