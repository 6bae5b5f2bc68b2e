//! Task store
//!
//! The `TodoStore` holds the local copy of every persisted todo, in
//! insertion order, plus at most one pending placeholder for an in-flight
//! create. It is mutated only by the sync engine.
//!
//! The clear-completed flag is recomputed after every mutation, so readers
//! never observe a stale value.

use std::collections::HashSet;

use tracing::warn;

use crate::models::{PendingTodo, Task, Todo, TodoId};

/// Local task collection
#[derive(Debug, Clone)]
pub struct TodoStore {
    /// Persisted todos in insertion order
    todos: Vec<Todo>,
    /// Placeholder for an unconfirmed create
    pending: Option<PendingTodo>,
    /// True when no todo is completed
    clear_completed_disabled: bool,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            todos: Vec::new(),
            pending: None,
            clear_completed_disabled: true,
        }
    }

    // ==================== Persisted Todos ====================

    /// Replace every persisted todo
    ///
    /// Later duplicates of an id are dropped.
    pub fn replace_all(&mut self, todos: Vec<Todo>) {
        let mut seen = HashSet::new();
        self.todos = todos
            .into_iter()
            .filter(|todo| seen.insert(todo.id))
            .collect();
        self.refresh_flags();
    }

    /// Take a freshly loaded list as the base, keeping local todos it lacks
    ///
    /// Todos created locally while the load was in flight are appended after
    /// the loaded ones. Ids in `deleted` are never resurrected.
    pub fn merge_loaded(&mut self, loaded: Vec<Todo>, deleted: &HashSet<TodoId>) {
        let local = std::mem::take(&mut self.todos);
        self.replace_all(loaded);
        self.todos.retain(|todo| !deleted.contains(&todo.id));

        for todo in local {
            if !self.contains(todo.id) && !deleted.contains(&todo.id) {
                self.todos.push(todo);
            }
        }
        self.refresh_flags();
    }

    /// Append a confirmed todo
    ///
    /// An existing todo with the same id is replaced in place.
    pub fn push(&mut self, todo: Todo) {
        match self.todos.iter_mut().find(|t| t.id == todo.id) {
            Some(existing) => {
                warn!("Todo {} already present, replacing", todo.id);
                *existing = todo;
            }
            None => self.todos.push(todo),
        }
        self.refresh_flags();
    }

    /// Remove a todo by id
    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let pos = self.todos.iter().position(|t| t.id == id)?;
        let removed = self.todos.remove(pos);
        self.refresh_flags();
        Some(removed)
    }

    /// Remove every todo whose id is in `ids`, preserving the order of the rest
    pub fn remove_many(&mut self, ids: &HashSet<TodoId>) -> usize {
        let before = self.todos.len();
        self.todos.retain(|todo| !ids.contains(&todo.id));
        self.refresh_flags();
        before - self.todos.len()
    }

    /// Get a todo by id
    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Check whether a todo exists
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    /// All persisted todos
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    // ==================== Pending Placeholder ====================

    /// Show a placeholder for an in-flight create
    ///
    /// Refused if one is already pending.
    pub fn begin_pending(&mut self, pending: PendingTodo) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(pending);
        true
    }

    /// Drop the placeholder, but only if it is the one identified by `temp_key`
    pub fn clear_pending(&mut self, temp_key: uuid::Uuid) -> Option<PendingTodo> {
        match &self.pending {
            Some(pending) if pending.temp_key == temp_key => self.pending.take(),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&PendingTodo> {
        self.pending.as_ref()
    }

    /// Every row: persisted todos followed by the placeholder, if any
    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        self.todos
            .iter()
            .cloned()
            .map(Task::Persisted)
            .chain(self.pending.iter().cloned().map(Task::Pending))
    }

    // ==================== Stats ====================

    /// Ids of completed todos, in store order
    pub fn completed_ids(&self) -> Vec<TodoId> {
        self.todos
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.id)
            .collect()
    }

    pub fn has_completed(&self) -> bool {
        self.todos.iter().any(|t| t.completed)
    }

    /// Number of todos not yet completed
    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.len() - self.active_count()
    }

    /// Whether the clear-completed action should be disabled
    pub fn clear_completed_disabled(&self) -> bool {
        self.clear_completed_disabled
    }

    fn refresh_flags(&mut self) {
        self.clear_completed_disabled = !self.has_completed();
    }
}
