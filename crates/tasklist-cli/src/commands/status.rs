//! Status command handler

use anyhow::Result;

use tasklist_core::{Config, LoadOutcome, SyncEngine};

use crate::output::{Output, OutputFormat};

/// Show status information
pub async fn show(engine: &SyncEngine, config: &Config, output: &Output) -> Result<()> {
    let reachable = matches!(engine.load().await, LoadOutcome::Loaded(_));
    let state = engine.snapshot();
    let total = state.todos().len();
    let active = state.active_count();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "user_id": engine.user_id(),
                    "reachable": reachable,
                    "counts": {
                        "total": total,
                        "active": active,
                        "completed": total - active
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", active);
        }
        OutputFormat::Human => {
            println!("tasklist Status");
            println!("===============");
            println!();
            println!("Server:");
            println!("  URL:     {}", config.api_url);
            println!("  User:    {}", engine.user_id());
            println!(
                "  Status:  {}",
                if reachable { "reachable" } else { "unreachable" }
            );
            println!();
            println!("Todos:");
            if reachable {
                println!("  Total:     {}", total);
                println!("  Active:    {}", active);
                println!("  Completed: {}", total - active);
            } else {
                println!("  (unavailable)");
            }
        }
    }

    Ok(())
}
