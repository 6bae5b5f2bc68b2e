//! Error notifications
//!
//! `Notifications` holds the distinct user-facing messages currently shown,
//! in the order they were first reported. Every report (re)starts a single
//! auto-dismiss timer; when it fires, every message is cleared and the
//! banner is hidden. Manual dismissal clears immediately and cancels the
//! timer.
//!
//! The timer is a tokio task owned by the channel. It holds only a weak
//! reference, so dropping the last handle aborts it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Default time before notices are cleared
pub const DEFAULT_NOTICE_TIMEOUT: Duration = Duration::from_millis(3000);

/// A user-facing error message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Notice {
    /// Initial list failed
    LoadFailed,
    /// Blank title submitted
    EmptyTitle,
    /// Create failed
    AddFailed,
    /// Single or batch delete failed
    DeleteFailed,
}

impl Notice {
    /// Text shown to the user
    pub fn message(self) -> &'static str {
        match self {
            Notice::LoadFailed => "Unable to load todos",
            Notice::EmptyTitle => "Title should not be empty",
            Notice::AddFailed => "Unable to add a todo",
            Notice::DeleteFailed => "Unable to delete a todo",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// What the notification region currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoticeBoard {
    pub visible: bool,
    pub messages: Vec<Notice>,
}

#[derive(Default)]
struct Inner {
    messages: Vec<Notice>,
    visible: bool,
    /// Bumped on every report and dismissal; a timer only clears its own generation
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn clear(&mut self) {
        self.messages.clear();
        self.visible = false;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// De-duplicated, auto-expiring error banner
#[derive(Clone)]
pub struct Notifications {
    inner: Arc<Mutex<Inner>>,
    timeout: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TIMEOUT)
    }
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("board", &self.board())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Notifications {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            timeout,
        }
    }

    /// Show a notice and restart the auto-dismiss timer
    pub fn report(&self, notice: Notice) {
        let mut inner = self.lock();
        if !inner.messages.contains(&notice) {
            inner.messages.push(notice);
        }
        inner.visible = true;
        inner.generation += 1;
        inner.cancel_timer();

        debug!("Notice reported: {}", notice);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, notice will stay until dismissed");
            return;
        };
        let deadline = Instant::now() + self.timeout;
        inner.timer = Some(runtime.spawn(expire(
            Arc::downgrade(&self.inner),
            inner.generation,
            deadline,
        )));
    }

    /// Hide and clear all notices now
    pub fn dismiss(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.cancel_timer();
        inner.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    /// Current messages in first-reported order
    pub fn messages(&self) -> Vec<Notice> {
        self.lock().messages.clone()
    }

    pub fn board(&self) -> NoticeBoard {
        let inner = self.lock();
        NoticeBoard {
            visible: inner.visible,
            messages: inner.messages.clone(),
        }
    }

    /// Whether an auto-dismiss timer is armed
    pub fn has_pending_timer(&self) -> bool {
        self.lock()
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn expire(inner: Weak<Mutex<Inner>>, generation: u64, deadline: Instant) {
    tokio::time::sleep_until(deadline).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if inner.generation == generation {
        debug!("Notices expired");
        inner.clear();
        inner.timer = None;
    }
}
