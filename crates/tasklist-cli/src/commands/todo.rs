//! Todo command handlers

use anyhow::{bail, Result};

use tasklist_core::{
    ClearOutcome, CreateOutcome, DeleteOutcome, Filter, Notice, SyncEngine, Task, Todo, TodoId,
};

use super::load;
use crate::output::{Output, OutputFormat};

/// List todos matching a filter
pub async fn list(engine: &SyncEngine, filter: Filter, output: &Output) -> Result<()> {
    load(engine).await?;

    let state = engine.snapshot();
    let todos: Vec<Todo> = state
        .rows(filter)
        .into_iter()
        .filter_map(|task| match task {
            Task::Persisted(todo) => Some(todo),
            Task::Pending(_) => None,
        })
        .collect();

    output.print_todos(&todos, state.active_count());
    Ok(())
}

/// Create a new todo
pub async fn add(engine: &SyncEngine, title: &str, output: &Output) -> Result<()> {
    match engine.create(title).await {
        CreateOutcome::Created(todo) => {
            output.success(&format!("Added todo {}", todo.id));
            if output.format != OutputFormat::Json {
                output.print_todo(&todo);
            }
            Ok(())
        }
        CreateOutcome::Rejected(e) => bail!("{}", e),
        CreateOutcome::Failed => bail!("{}", Notice::AddFailed),
        CreateOutcome::Busy => bail!("Another todo is still being added"),
    }
}

/// Delete a todo by id
pub async fn delete(engine: &SyncEngine, id: TodoId, output: &Output) -> Result<()> {
    load(engine).await?;

    match engine.delete(id).await {
        DeleteOutcome::Deleted(id) => {
            output.success(&format!("Deleted todo {}", id));
            Ok(())
        }
        DeleteOutcome::NotFound => bail!("Todo not found: {}", id),
        DeleteOutcome::Failed => bail!("{}", Notice::DeleteFailed),
        DeleteOutcome::Busy => bail!("Another delete is still in progress"),
    }
}

/// Delete every completed todo
pub async fn clear_completed(engine: &SyncEngine, output: &Output) -> Result<()> {
    load(engine).await?;

    let batch = match engine.clear_completed().await {
        ClearOutcome::Nothing => {
            output.message("No completed todos.");
            return Ok(());
        }
        ClearOutcome::Busy => bail!("Another delete is still in progress"),
        ClearOutcome::Settled(batch) => batch,
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "deleted": raw_ids(&batch.deleted),
                    "failed": raw_ids(&batch.failed)
                })
            );
        }
        _ => {
            if !batch.deleted.is_empty() {
                output.success(&format!(
                    "Cleared {} completed todo(s)",
                    batch.deleted.len()
                ));
            }
        }
    }

    if !batch.failed.is_empty() {
        let failed: Vec<String> = batch.failed.iter().map(ToString::to_string).collect();
        bail!("{}: {}", Notice::DeleteFailed, failed.join(", "));
    }
    Ok(())
}

fn raw_ids(ids: &[TodoId]) -> Vec<u64> {
    ids.iter().map(|id| id.get()).collect()
}
