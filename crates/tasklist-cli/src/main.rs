//! tasklist CLI
//!
//! Command-line interface for tasklist - a client for a remote todo list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tasklist_core::{Config, Filter, TodoId};

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

/// Environment variable holding the log level
pub(crate) const LOG_ENV: &str = "TASKLIST_LOG";

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - Manage your todos on a remote collection")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List todos
    #[command(alias = "ls")]
    List {
        /// Which todos to show (all, active, completed)
        #[arg(short, long, default_value_t = Filter::All)]
        filter: Filter,
    },
    /// Add a todo
    Add {
        /// Title of the new todo
        #[arg(allow_hyphen_values = true)]
        title: String,
    },
    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo id
        id: TodoId,
    },
    /// Delete every completed todo
    ClearCompleted,
    /// Show server status and counts
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, user_id, notice_timeout_ms, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without a user id
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let user_id = match config.user_id() {
        Ok(user_id) => user_id,
        Err(e) => {
            output.warning(&format!("{}. {}", e, e.recovery_suggestion()));
            std::process::exit(2);
        }
    };

    // Handle TUI (default when no command given)
    let command = cli.command.unwrap_or(Commands::Tui);
    if matches!(command, Commands::Tui) {
        return tui::run(config, user_id).await;
    }

    init_cli_logging();
    let engine = commands::connect(&config, user_id)?;

    match command {
        Commands::Tui => unreachable!(),           // Handled above
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::List { filter } => commands::todo::list(&engine, filter, &output).await,
        Commands::Add { title } => commands::todo::add(&engine, &title, &output).await,
        Commands::Delete { id } => commands::todo::delete(&engine, id, &output).await,
        Commands::ClearCompleted => commands::todo::clear_completed(&engine, &output).await,
        Commands::Status => commands::status::show(&engine, &config, &output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr, only if TASKLIST_LOG is set
fn init_cli_logging() {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(&log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Filter limited to this workspace's crates
pub(crate) fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("tasklist_core={},tasklist={}", level, level))
}
