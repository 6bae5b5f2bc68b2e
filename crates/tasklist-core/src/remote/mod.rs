//! Remote collection client
//!
//! The engine talks to the remote todo collection only through the
//! [`RemoteCollection`] trait. Every call is an independent round trip that
//! may fail; the engine never retries.
//!
//! ## Usage
//!
//! ```ignore
//! let remote = HttpCollection::new("https://mate.academy/students-api", UserId(42), timeout)?;
//! let todos = remote.list().await?;
//! ```

mod http;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;

use crate::error::RemoteResult;
use crate::models::{NewTodo, Todo, TodoId};

pub use http::{HttpCollection, DEFAULT_API_URL};

/// Operations the sync engine needs from the remote collection
///
/// Implementations are scoped to a single owner for the whole session.
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// Fetch every todo of the session owner
    async fn list(&self) -> RemoteResult<Vec<Todo>>;

    /// Persist a new todo; the server assigns its id
    async fn create(&self, todo: &NewTodo) -> RemoteResult<Todo>;

    /// Delete a todo; any non-success response is a failure
    async fn delete(&self, id: TodoId) -> RemoteResult<()>;
}
