//! Synchronization engine
//!
//! `SyncEngine` keeps the local `TodoStore` consistent with the remote
//! collection. It drives the initial load, optimistic create, single delete
//! and the best-effort batch delete of completed todos, and reports
//! failures to the notification channel.
//!
//! ## Concurrency
//!
//! The engine is cheap to clone; clones share state, so a front end can
//! spawn each user action as its own task. State is guarded by a mutex that
//! is only held between awaits, never across one. Every commit therefore
//! applies to whatever the store holds when the network call resolves.
//!
//! Operations never return errors. Each one leaves the store renderable and
//! reports what happened through an outcome value.
//!
//! ## Usage
//!
//! ```ignore
//! let engine = SyncEngine::new(Arc::new(remote), user_id, Notifications::default());
//! engine.load().await;
//! engine.create("  Buy milk  ").await;
//! engine.clear_completed().await;
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::lock::{DeleteLock, InputLock, LockTicket, OperationLock, Settlement};
use crate::models::{NewTodo, PendingTodo, Task, Title, Todo, TodoId, UserId};
use crate::notify::{Notice, NoticeBoard, Notifications};
use crate::remote::RemoteCollection;
use crate::store::TodoStore;
use crate::view::{self, Filter};

/// Result of the initial load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Store now holds this many todos
    Loaded(usize),
    Failed,
}

/// Result of a create attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Todo),
    /// Rejected before any network call
    Rejected(ValidationError),
    Failed,
    /// Another create is still in flight
    Busy,
}

/// A create whose placeholder is shown and whose request is not yet sent
///
/// Holds the input lock; pass it to `SyncEngine::finish_create`.
#[derive(Debug)]
#[must_use = "the input lock stays engaged until the create is finished"]
pub struct StartedCreate {
    ticket: LockTicket<InputLock>,
    temp_key: Uuid,
    title: Title,
}

impl StartedCreate {
    pub fn title(&self) -> &str {
        self.title.as_str()
    }
}

/// Result of a single delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(TodoId),
    Failed,
    /// No todo with that id
    NotFound,
    /// Another delete is still in flight
    Busy,
}

/// Per-item results of a batch delete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub deleted: Vec<TodoId>,
    pub failed: Vec<TodoId>,
}

/// Result of clearing completed todos
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// No completed todos
    Nothing,
    /// Another delete is still in flight
    Busy,
    Settled(BatchOutcome),
}

/// Owned copy of everything a renderer needs
#[derive(Debug, Clone)]
pub struct ViewState {
    pub store: TodoStore,
    pub loading: bool,
    pub input_disabled: bool,
    pub delete_disabled: bool,
    pub draft: String,
    /// Increases every time an operation hands focus back to the entry field
    pub focus_requests: u64,
    pub notices: NoticeBoard,
}

impl ViewState {
    /// Rows for a filter mode
    pub fn rows(&self, filter: Filter) -> Vec<Task> {
        view::project(&self.store, filter)
    }

    pub fn todos(&self) -> &[Todo] {
        self.store.todos()
    }

    pub fn pending(&self) -> Option<&PendingTodo> {
        self.store.pending()
    }

    pub fn clear_completed_disabled(&self) -> bool {
        self.store.clear_completed_disabled()
    }

    /// "N items left"
    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }
}

struct EngineState {
    store: TodoStore,
    loading: bool,
    input_lock: OperationLock<InputLock>,
    delete_lock: OperationLock<DeleteLock>,
    draft: String,
    focus_requests: u64,
    /// Ids deleted while a load was in flight, kept out of its result
    deleted_while_loading: HashSet<TodoId>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            store: TodoStore::new(),
            loading: true,
            input_lock: OperationLock::new(),
            delete_lock: OperationLock::new(),
            draft: String::new(),
            focus_requests: 0,
            deleted_while_loading: HashSet::new(),
        }
    }

    fn record_deleted(&mut self, ids: impl IntoIterator<Item = TodoId>) {
        if self.loading {
            self.deleted_while_loading.extend(ids);
        }
    }

    fn request_focus(&mut self) {
        self.focus_requests += 1;
    }
}

struct Shared {
    remote: Arc<dyn RemoteCollection>,
    user_id: UserId,
    notices: Notifications,
    state: Mutex<EngineState>,
}

/// Optimistic sync engine for one user's todo collection
#[derive(Clone)]
pub struct SyncEngine {
    shared: Arc<Shared>,
}

impl SyncEngine {
    /// Create an engine with an empty store
    ///
    /// The loading flag starts set until `load` settles.
    pub fn new(
        remote: Arc<dyn RemoteCollection>,
        user_id: UserId,
        notices: Notifications,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                remote,
                user_id,
                notices,
                state: Mutex::new(EngineState::new()),
            }),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.shared.user_id
    }

    pub fn notifications(&self) -> &Notifications {
        &self.shared.notices
    }

    // ==================== Load ====================

    /// Fetch the collection and merge it into the store
    pub async fn load(&self) -> LoadOutcome {
        {
            let mut state = self.state();
            state.loading = true;
            state.deleted_while_loading.clear();
        }

        debug!("Loading todos for user {}", self.shared.user_id);
        let result = self.shared.remote.list().await;

        let mut state = self.state();
        let outcome = match result {
            Ok(todos) => {
                let total = todos.len();
                let owned: Vec<Todo> = todos
                    .into_iter()
                    .filter(|todo| todo.user_id == self.shared.user_id)
                    .collect();
                if owned.len() < total {
                    debug!("Ignored {} todos of other users", total - owned.len());
                }

                let deleted = std::mem::take(&mut state.deleted_while_loading);
                state.store.merge_loaded(owned, &deleted);
                info!("Loaded {} todos", state.store.len());
                LoadOutcome::Loaded(state.store.len())
            }
            Err(e) => {
                warn!("Failed to load todos: {}", e);
                self.shared.notices.report(Notice::LoadFailed);
                LoadOutcome::Failed
            }
        };
        state.loading = false;
        state.deleted_while_loading.clear();
        outcome
    }

    // ==================== Create ====================

    /// Create a todo optimistically
    ///
    /// A placeholder is shown until the server answers. On success the
    /// confirmed todo replaces it and the draft is cleared; on failure the
    /// placeholder is discarded and the draft kept.
    pub async fn create(&self, raw_title: &str) -> CreateOutcome {
        match self.begin_create(raw_title) {
            Ok(create) => self.finish_create(create).await,
            Err(outcome) => outcome,
        }
    }

    /// Create a todo from the current draft text
    pub async fn submit_draft(&self) -> CreateOutcome {
        match self.begin_submit() {
            Ok(create) => self.finish_create(create).await,
            Err(outcome) => outcome,
        }
    }

    /// Start a create from the current draft without awaiting anything
    ///
    /// When this returns `Ok`, the entry field is already disabled and the
    /// placeholder is in the store, so later edits cannot reach the request.
    pub fn begin_submit(&self) -> Result<StartedCreate, CreateOutcome> {
        let draft = self.state().draft.clone();
        self.begin_create(&draft)
    }

    /// Validate the title, engage the input lock and show the placeholder
    pub fn begin_create(&self, raw_title: &str) -> Result<StartedCreate, CreateOutcome> {
        let title = match Title::parse(raw_title) {
            Ok(title) => title,
            Err(e) => {
                debug!("Rejected title {:?}", raw_title);
                self.shared.notices.report(Notice::EmptyTitle);
                return Err(CreateOutcome::Rejected(e));
            }
        };

        let mut state = self.state();
        let Some(ticket) = state.input_lock.acquire() else {
            return Err(CreateOutcome::Busy);
        };

        let pending = PendingTodo::new(self.shared.user_id, &title);
        let temp_key = pending.temp_key;
        if !state.store.begin_pending(pending) {
            warn!("Placeholder already present, refusing create");
            state.input_lock.settle(ticket, Settlement::Failed);
            return Err(CreateOutcome::Busy);
        }

        Ok(StartedCreate {
            ticket,
            temp_key,
            title,
        })
    }

    /// Send a started create and commit the server's answer
    pub async fn finish_create(&self, create: StartedCreate) -> CreateOutcome {
        let StartedCreate {
            ticket,
            temp_key,
            title,
        } = create;

        debug!("Creating todo {:?}", title.as_str());
        let request = NewTodo::new(self.shared.user_id, &title);
        let result = self.shared.remote.create(&request).await;

        let mut state = self.state();
        state.store.clear_pending(temp_key);
        let (outcome, settlement) = match result {
            Ok(todo) => {
                info!("Created todo {}", todo.id);
                state.store.push(todo.clone());
                state.draft.clear();
                (CreateOutcome::Created(todo), Settlement::Committed)
            }
            Err(e) => {
                warn!("Failed to create todo: {}", e);
                self.shared.notices.report(Notice::AddFailed);
                (CreateOutcome::Failed, Settlement::Failed)
            }
        };
        state.input_lock.settle(ticket, settlement);
        state.request_focus();
        outcome
    }

    /// Replace the draft text of the entry field
    ///
    /// Ignored while a create is in flight, as the field is disabled.
    pub fn set_draft(&self, text: impl Into<String>) {
        let mut state = self.state();
        if !state.input_lock.is_engaged() {
            state.draft = text.into();
        }
    }

    pub fn draft(&self) -> String {
        self.state().draft.clone()
    }

    // ==================== Delete ====================

    /// Delete one todo
    pub async fn delete(&self, id: TodoId) -> DeleteOutcome {
        let ticket = {
            let mut state = self.state();
            if !state.store.contains(id) {
                debug!("Delete of unknown todo {}", id);
                return DeleteOutcome::NotFound;
            }
            let Some(ticket) = state.delete_lock.acquire() else {
                return DeleteOutcome::Busy;
            };
            ticket
        };

        debug!("Deleting todo {}", id);
        let result = self.shared.remote.delete(id).await;

        let mut state = self.state();
        let (outcome, settlement) = match result {
            Ok(()) => {
                info!("Deleted todo {}", id);
                state.store.remove(id);
                state.record_deleted([id]);
                (DeleteOutcome::Deleted(id), Settlement::Committed)
            }
            Err(e) => {
                warn!("Failed to delete todo {}: {}", id, e);
                self.shared.notices.report(Notice::DeleteFailed);
                (DeleteOutcome::Failed, Settlement::Failed)
            }
        };
        state.delete_lock.settle(ticket, settlement);
        state.request_focus();
        outcome
    }

    /// Delete every completed todo
    ///
    /// All deletes run concurrently and each settles independently. The
    /// store is updated once, after every call has settled: todos whose
    /// delete succeeded disappear, the others stay in place.
    pub async fn clear_completed(&self) -> ClearOutcome {
        let (ticket, ids) = {
            let mut state = self.state();
            let ids = state.store.completed_ids();
            if ids.is_empty() {
                return ClearOutcome::Nothing;
            }
            let Some(ticket) = state.delete_lock.acquire() else {
                return ClearOutcome::Busy;
            };
            (ticket, ids)
        };

        info!("Clearing {} completed todos", ids.len());
        let remote = &self.shared.remote;
        let results = join_all(
            ids.iter().map(|&id| async move { (id, remote.delete(id).await) }),
        )
        .await;

        let mut batch = BatchOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => batch.deleted.push(id),
                Err(e) => {
                    warn!("Failed to delete todo {}: {}", id, e);
                    batch.failed.push(id);
                }
            }
        }

        let mut state = self.state();
        let removed: HashSet<TodoId> = batch.deleted.iter().copied().collect();
        state.store.remove_many(&removed);
        state.record_deleted(removed);

        let settlement = if batch.failed.is_empty() {
            Settlement::Committed
        } else {
            self.shared.notices.report(Notice::DeleteFailed);
            Settlement::Failed
        };
        state.delete_lock.settle(ticket, settlement);
        state.request_focus();

        info!(
            "Cleared {} completed todos, {} failed",
            batch.deleted.len(),
            batch.failed.len()
        );
        ClearOutcome::Settled(batch)
    }

    // ==================== View ====================

    /// Hide the notification banner now
    pub fn dismiss_notices(&self) {
        self.shared.notices.dismiss();
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> ViewState {
        let state = self.state();
        ViewState {
            store: state.store.clone(),
            loading: state.loading,
            input_disabled: state.input_lock.is_engaged(),
            delete_disabled: state.delete_lock.is_engaged(),
            draft: state.draft.clone(),
            focus_requests: state.focus_requests,
            notices: self.shared.notices.board(),
        }
    }

    /// Rows for a filter mode
    pub fn rows(&self, filter: Filter) -> Vec<Task> {
        view::project(&self.state().store, filter)
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
