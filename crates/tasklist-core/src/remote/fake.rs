//! Scripted in-memory collection for engine tests
//!
//! Outcomes are configured up front. Individual calls can be held at a gate
//! so tests control the order in which concurrent requests settle.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Semaphore;

use super::RemoteCollection;
use crate::error::{RemoteError, RemoteResult};
use crate::models::{NewTodo, Todo, TodoId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GateKey {
    List,
    Create,
    Delete(TodoId),
}

#[derive(Default)]
struct Script {
    list: Option<Vec<Todo>>,
    fail_create: bool,
    fail_deletes: HashSet<TodoId>,
    next_id: u64,
    created: Vec<NewTodo>,
    deleted: Vec<TodoId>,
    list_calls: usize,
    delete_calls: usize,
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedCollection {
    script: Arc<Mutex<Script>>,
    gates: Arc<Mutex<HashMap<GateKey, Arc<Semaphore>>>>,
}

pub(crate) fn todo(id: u64, title: &str, completed: bool) -> Todo {
    Todo {
        id: TodoId::new(id).unwrap(),
        user_id: UserId(1),
        title: title.to_string(),
        completed,
    }
}

pub(crate) fn id(raw: u64) -> TodoId {
    TodoId::new(raw).unwrap()
}

fn server_error(what: &str) -> RemoteError {
    RemoteError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        url: format!("fake://{}", what),
    }
}

impl ScriptedCollection {
    /// Collection whose list call returns `todos`
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let fake = Self::default();
        {
            let mut script = fake.script.lock().unwrap();
            script.next_id = todos.iter().map(|t| t.id.get()).max().unwrap_or(0) + 100;
            script.list = Some(todos);
        }
        fake
    }

    /// Collection whose list call fails
    pub fn failing_list() -> Self {
        let fake = Self::default();
        fake.script.lock().unwrap().next_id = 100;
        fake
    }

    pub fn fail_create(&self, fail: bool) {
        self.script.lock().unwrap().fail_create = fail;
    }

    pub fn fail_delete(&self, id: TodoId) {
        self.script.lock().unwrap().fail_deletes.insert(id);
    }

    pub fn hold_list(&self) {
        self.hold(GateKey::List);
    }

    pub fn release_list(&self) {
        self.release(GateKey::List);
    }

    pub fn hold_create(&self) {
        self.hold(GateKey::Create);
    }

    pub fn release_create(&self) {
        self.release(GateKey::Create);
    }

    pub fn hold_delete(&self, id: TodoId) {
        self.hold(GateKey::Delete(id));
    }

    pub fn release_delete(&self, id: TodoId) {
        self.release(GateKey::Delete(id));
    }

    pub fn created(&self) -> Vec<NewTodo> {
        self.script.lock().unwrap().created.clone()
    }

    pub fn deleted(&self) -> Vec<TodoId> {
        self.script.lock().unwrap().deleted.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.script.lock().unwrap().list_calls
    }

    /// Delete calls issued so far, including failed and held ones
    pub fn delete_calls(&self) -> usize {
        self.script.lock().unwrap().delete_calls
    }

    fn hold(&self, key: GateKey) {
        self.gates
            .lock()
            .unwrap()
            .insert(key, Arc::new(Semaphore::new(0)));
    }

    fn release(&self, key: GateKey) {
        if let Some(gate) = self.gates.lock().unwrap().get(&key) {
            gate.add_permits(1);
        }
    }

    async fn pass(&self, key: GateKey) {
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }
    }
}

#[async_trait]
impl RemoteCollection for ScriptedCollection {
    async fn list(&self) -> RemoteResult<Vec<Todo>> {
        self.script.lock().unwrap().list_calls += 1;
        self.pass(GateKey::List).await;

        self.script
            .lock()
            .unwrap()
            .list
            .clone()
            .ok_or_else(|| server_error("list"))
    }

    async fn create(&self, new_todo: &NewTodo) -> RemoteResult<Todo> {
        self.script.lock().unwrap().created.push(new_todo.clone());
        self.pass(GateKey::Create).await;

        let mut script = self.script.lock().unwrap();
        if script.fail_create {
            return Err(server_error("create"));
        }
        script.next_id += 1;
        Ok(Todo {
            id: TodoId::new(script.next_id).unwrap(),
            user_id: new_todo.user_id,
            title: new_todo.title.clone(),
            completed: new_todo.completed,
        })
    }

    async fn delete(&self, id: TodoId) -> RemoteResult<()> {
        self.script.lock().unwrap().delete_calls += 1;
        self.pass(GateKey::Delete(id)).await;

        let mut script = self.script.lock().unwrap();
        if script.fail_deletes.contains(&id) {
            return Err(server_error("delete"));
        }
        script.deleted.push(id);
        Ok(())
    }
}
