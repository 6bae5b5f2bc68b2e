//! Application state

use std::future::Future;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;
use tracing::debug;

use tasklist_core::{
    ClearOutcome, CreateOutcome, DeleteOutcome, Filter, LoadOutcome, SyncEngine, Task, TodoId,
    ViewState,
};

/// How long a status message stays in the hint line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Engine work requested by a key press, run off the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create a todo from the draft
    Submit,
    Delete(TodoId),
    ClearCompleted,
}

/// Result of a finished engine operation
#[derive(Debug)]
pub enum AppEvent {
    Loaded(LoadOutcome),
    Created(CreateOutcome),
    Deleted(DeleteOutcome),
    Cleared(ClearOutcome),
}

/// Application state
pub struct App {
    engine: SyncEngine,
    /// Latest engine snapshot
    pub view: ViewState,
    /// Current filter tab
    pub filter: Filter,
    /// Selected row index in the filtered list
    pub selected: usize,
    /// Whether the list (rather than the entry field) has focus
    pub list_focused: bool,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    status_message_time: Option<Instant>,
    /// Last focus request seen from the engine
    seen_focus: u64,
}

impl App {
    pub fn new(engine: SyncEngine) -> Self {
        let view = engine.snapshot();
        Self {
            seen_focus: view.focus_requests,
            engine,
            view,
            filter: Filter::All,
            selected: 0,
            list_focused: false,
            should_quit: false,
            status_message: None,
            status_message_time: None,
        }
    }

    /// Take a fresh snapshot from the engine
    pub fn refresh(&mut self) {
        self.view = self.engine.snapshot();

        // Operations hand focus back to the entry field
        if self.view.focus_requests != self.seen_focus {
            self.seen_focus = self.view.focus_requests;
            self.list_focused = false;
        }
        self.clamp_selection();
    }

    /// Rows for the current filter
    pub fn rows(&self) -> Vec<Task> {
        self.view.rows(self.filter)
    }

    /// Id of the selected row, if it is a persisted todo
    pub fn selected_id(&self) -> Option<TodoId> {
        self.rows().get(self.selected).and_then(Task::id)
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Handle a key press, returning engine work to run
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                None
            }
            KeyCode::Char('d') if ctrl => {
                if self.view.delete_disabled {
                    return None;
                }
                self.selected_id().map(Action::Delete)
            }
            KeyCode::Char('x') if ctrl => {
                let enabled = !self.view.delete_disabled && !self.view.clear_completed_disabled();
                enabled.then_some(Action::ClearCompleted)
            }
            KeyCode::Esc => {
                self.engine.dismiss_notices();
                self.refresh();
                None
            }
            KeyCode::Enter => (!self.view.input_disabled).then_some(Action::Submit),
            KeyCode::Tab => {
                self.set_filter(self.filter.next());
                None
            }
            KeyCode::BackTab => {
                self.set_filter(self.filter.prev());
                None
            }
            KeyCode::Up => {
                self.list_focused = true;
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                self.list_focused = true;
                let len = self.rows().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Backspace => {
                self.edit_draft(|draft| {
                    draft.pop();
                });
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.edit_draft(|draft| draft.push(c));
                None
            }
            _ => None,
        }
    }

    /// Start the engine work for an action
    ///
    /// A submit takes the input lock and shows the placeholder before this
    /// returns, so keys handled next see the disabled entry field. Only the
    /// network part runs on its own task and reports back on `event_tx`.
    pub fn dispatch(&mut self, action: Action, event_tx: &mpsc::UnboundedSender<AppEvent>) {
        debug!("Dispatching {:?}", action);
        let engine = self.engine.clone();

        match action {
            Action::Submit => match engine.begin_submit() {
                Ok(create) => spawn_reporting(event_tx, async move {
                    AppEvent::Created(engine.finish_create(create).await)
                }),
                Err(outcome) => self.on_event(AppEvent::Created(outcome)),
            },
            Action::Delete(id) => spawn_reporting(event_tx, async move {
                AppEvent::Deleted(engine.delete(id).await)
            }),
            Action::ClearCompleted => spawn_reporting(event_tx, async move {
                AppEvent::Cleared(engine.clear_completed().await)
            }),
        }
        self.refresh();
    }

    /// React to a finished operation
    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded(LoadOutcome::Loaded(count)) => {
                self.set_status(format!("Loaded {} todo(s)", count));
            }
            AppEvent::Created(CreateOutcome::Created(todo)) => {
                self.set_status(format!("Added \"{}\"", todo.title));
            }
            AppEvent::Deleted(DeleteOutcome::Deleted(id)) => {
                self.set_status(format!("Deleted todo {}", id));
            }
            AppEvent::Cleared(ClearOutcome::Settled(batch)) if !batch.deleted.is_empty() => {
                self.set_status(format!("Cleared {} completed", batch.deleted.len()));
            }
            // Failures are already on the notification board
            _ => {}
        }
        self.refresh();
    }

    fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.selected = 0;
    }

    /// Edit the draft unless the entry field is disabled
    fn edit_draft(&mut self, edit: impl FnOnce(&mut String)) {
        if self.view.input_disabled {
            return;
        }
        let mut draft = self.view.draft.clone();
        edit(&mut draft);
        self.engine.set_draft(draft);
        self.list_focused = false;
        self.refresh();
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

/// Run an operation off the event loop and send its result back
fn spawn_reporting<F>(event_tx: &mpsc::UnboundedSender<AppEvent>, work: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let event_tx = event_tx.clone();
    tokio::spawn(async move {
        // Receiver is gone once the TUI has quit
        let _ = event_tx.send(work.await);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tasklist_core::{HttpCollection, Notice, Notifications, Todo, TodoStore, UserId};

    /// App over an engine whose server is unreachable
    fn app() -> App {
        let remote =
            HttpCollection::new("http://127.0.0.1:9", UserId(1), Duration::from_secs(1)).unwrap();
        let engine = SyncEngine::new(Arc::new(remote), UserId(1), Notifications::default());
        App::new(engine)
    }

    fn with_todos(app: &mut App, todos: &[(u64, bool)]) {
        let mut store = TodoStore::new();
        store.replace_all(
            todos
                .iter()
                .map(|&(id, completed)| Todo {
                    id: TodoId::new(id).unwrap(),
                    user_id: UserId(1),
                    title: format!("todo {}", id),
                    completed,
                })
                .collect(),
        );
        app.view.store = store;
        app.view.loading = false;
    }

    fn press(app: &mut App, code: KeyCode) -> Option<Action> {
        app.handle_key(code, KeyModifiers::NONE)
    }

    fn ctrl(app: &mut App, c: char) -> Option<Action> {
        app.handle_key(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_edits_draft() {
        let mut app = app();
        for c in "Buy milkk".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.view.draft, "Buy milk");
        assert_eq!(press(&mut app, KeyCode::Enter), Some(Action::Submit));
    }

    #[test]
    fn test_input_disabled_blocks_editing() {
        let mut app = app();
        app.view.input_disabled = true;

        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.view.draft, "");
        assert_eq!(press(&mut app, KeyCode::Enter), None);
    }

    #[tokio::test]
    async fn test_keys_after_enter_do_not_change_submitted_title() {
        let mut app = app();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        for c in "Buy milk".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let action = press(&mut app, KeyCode::Enter).unwrap();
        app.dispatch(action, &event_tx);
        press(&mut app, KeyCode::Char('!'));

        assert!(app.view.input_disabled);
        assert_eq!(app.view.pending().unwrap().title, "Buy milk");
        assert_eq!(app.view.draft, "Buy milk");
        assert_eq!(press(&mut app, KeyCode::Enter), None);

        tokio::task::yield_now().await;
        app.refresh();
        assert_eq!(app.view.draft, "Buy milk");
    }

    #[tokio::test]
    async fn test_blank_submit_reports_without_spawning() {
        let mut app = app();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        app.dispatch(Action::Submit, &event_tx);

        assert!(!app.view.input_disabled);
        assert!(app.view.pending().is_none());
        assert_eq!(app.view.notices.messages, vec![Notice::EmptyTitle]);
        assert!(event_rx.try_recv().is_err());
    }

    #[test]
    fn test_delete_selected() {
        let mut app = app();
        with_todos(&mut app, &[(1, false), (2, true), (3, false)]);

        press(&mut app, KeyCode::Down);
        assert!(app.list_focused);
        assert_eq!(ctrl(&mut app, 'd'), Some(Action::Delete(TodoId::new(2).unwrap())));

        app.view.delete_disabled = true;
        assert_eq!(ctrl(&mut app, 'd'), None);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = app();
        with_todos(&mut app, &[(1, false), (2, false)]);

        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 0);
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_filter_tabs_reset_selection() {
        let mut app = app();
        with_todos(&mut app, &[(1, false), (2, true), (3, true)]);
        press(&mut app, KeyCode::Down);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.filter, Filter::Active);
        assert_eq!(app.selected, 0);
        assert_eq!(app.rows().len(), 1);

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.filter, Filter::Completed);
        assert_eq!(app.selected_id(), TodoId::new(2));
    }

    #[test]
    fn test_clear_completed_requires_completed() {
        let mut app = app();
        with_todos(&mut app, &[(1, false)]);
        assert_eq!(ctrl(&mut app, 'x'), None);

        with_todos(&mut app, &[(1, false), (2, true)]);
        assert_eq!(ctrl(&mut app, 'x'), Some(Action::ClearCompleted));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        assert_eq!(ctrl(&mut app, 'c'), None);
        assert!(app.should_quit);
        assert_eq!(app.view.draft, "");
    }

    #[test]
    fn test_status_message_from_event() {
        let mut app = app();
        app.on_event(AppEvent::Deleted(DeleteOutcome::Deleted(TodoId::new(4).unwrap())));
        assert_eq!(app.status_message.as_deref(), Some("Deleted todo 4"));

        app.status_message = None;
        app.on_event(AppEvent::Deleted(DeleteOutcome::Failed));
        assert!(app.status_message.is_none());
    }
}
