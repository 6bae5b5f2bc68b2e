//! tasklist Core Library
//!
//! This crate provides the core functionality for tasklist, a client for a
//! remote, single-user todo collection with optimistic local updates.
//!
//! # Architecture
//!
//! - **Remote collection**: the server owns the data; every change is a
//!   round trip that may fail
//! - **Sync engine**: applies changes locally as soon as the server
//!   confirms them, shows a placeholder while a create is in flight and
//!   keeps the local store consistent under partial failure
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let remote = HttpCollection::new(&config.api_url, config.user_id()?, config.request_timeout())?;
//! let engine = SyncEngine::new(Arc::new(remote), user_id, Notifications::new(config.notice_timeout()));
//!
//! engine.load().await;
//! engine.create("Buy milk").await;
//! let rows = engine.rows(Filter::Active);
//! ```
//!
//! # Modules
//!
//! - `engine`: load, create, delete and batch delete (main entry point)
//! - `models`: todos, ids, titles and the pending placeholder
//! - `remote`: remote collection trait and its HTTP client
//! - `store`: local todo collection
//! - `notify`: de-duplicated, auto-expiring error notices
//! - `lock`: per-operation UI locks
//! - `view`: filter modes and row projection
//! - `error`: error types
//! - `config`: application configuration

pub mod config;
pub mod engine;
pub mod error;
pub mod lock;
pub mod models;
pub mod notify;
pub mod remote;
pub mod store;
pub mod view;

pub use config::Config;
pub use engine::{
    BatchOutcome, ClearOutcome, CreateOutcome, DeleteOutcome, LoadOutcome, StartedCreate,
    SyncEngine, ViewState,
};
pub use error::{ConfigError, RemoteError, ValidationError};
pub use models::{NewTodo, PendingTodo, Task, Title, Todo, TodoId, UserId};
pub use notify::{Notice, NoticeBoard, Notifications};
pub use remote::{HttpCollection, RemoteCollection};
pub use store::TodoStore;
pub use view::Filter;
