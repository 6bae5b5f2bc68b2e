//! Data models for tasklist
//!
//! Defines the core data structures: Todo, its identifiers, validated
//! titles, and the pending placeholder shown while a create is in flight.
//! `Todo` and `NewTodo` are also the JSON wire types of the remote
//! collection.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Server-assigned identifier of a persisted todo
///
/// Zero is not representable, so a persisted todo can never be confused
/// with a not-yet-persisted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(NonZeroU64);

impl TodoId {
    /// Create an id, returning `None` for zero
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }

    /// Get the raw value
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid todo id: '{}'", s))?;
        Self::new(raw).ok_or_else(|| "Todo id must be non-zero".to_string())
    }
}

/// Owner of a todo collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A todo title that has been trimmed and is known to be non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Trim and validate raw user input
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A todo confirmed by the remote collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Server-assigned identifier
    pub id: TodoId,
    /// Owner of the todo
    pub user_id: UserId,
    /// Display title
    pub title: String,
    /// Whether the todo is done
    pub completed: bool,
}

/// Body of a create request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

impl NewTodo {
    /// Create request for a new, not completed todo
    pub fn new(user_id: UserId, title: &Title) -> Self {
        Self {
            user_id,
            title: title.as_str().to_string(),
            completed: false,
        }
    }
}

/// Placeholder for a todo whose create request has not resolved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTodo {
    /// Local key, never sent to the server
    pub temp_key: Uuid,
    pub user_id: UserId,
    pub title: String,
}

impl PendingTodo {
    pub fn new(user_id: UserId, title: &Title) -> Self {
        Self {
            temp_key: Uuid::new_v4(),
            user_id,
            title: title.as_str().to_string(),
        }
    }
}

/// A row as seen by the view: confirmed or still pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Persisted(Todo),
    Pending(PendingTodo),
}

impl Task {
    pub fn title(&self) -> &str {
        match self {
            Task::Persisted(todo) => &todo.title,
            Task::Pending(pending) => &pending.title,
        }
    }

    /// Pending placeholders are never completed
    pub fn completed(&self) -> bool {
        match self {
            Task::Persisted(todo) => todo.completed,
            Task::Pending(_) => false,
        }
    }

    /// Server id, if the task has been persisted
    pub fn id(&self) -> Option<TodoId> {
        match self {
            Task::Persisted(todo) => Some(todo.id),
            Task::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Task::Pending(_))
    }
}
