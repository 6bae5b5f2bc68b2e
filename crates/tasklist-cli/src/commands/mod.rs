//! One-shot command handlers

pub mod config;
pub mod status;
pub mod todo;

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use tasklist_core::{Config, HttpCollection, LoadOutcome, Notice, Notifications, SyncEngine, UserId};

/// Build an engine talking to the configured collection
pub fn connect(config: &Config, user_id: UserId) -> Result<SyncEngine> {
    let remote = HttpCollection::new(&config.api_url, user_id, config.request_timeout())
        .context("Failed to create HTTP client")?;

    Ok(SyncEngine::new(
        Arc::new(remote),
        user_id,
        Notifications::new(config.notice_timeout()),
    ))
}

/// Load the collection, failing the command if it cannot be fetched
async fn load(engine: &SyncEngine) -> Result<()> {
    match engine.load().await {
        LoadOutcome::Loaded(_) => Ok(()),
        LoadOutcome::Failed => bail!("{}", Notice::LoadFailed),
    }
}
