//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use tasklist_core::{Task, Todo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single todo
    pub fn print_todo(&self, todo: &Todo) {
        match self.format {
            OutputFormat::Human => println!("{}", todo_line(todo)),
            OutputFormat::Json => print_json(todo),
            OutputFormat::Quiet => println!("{}", todo.id),
        }
    }

    /// Print a list of rows followed by the active counter
    pub fn print_todos(&self, todos: &[Todo], active: usize) {
        match self.format {
            OutputFormat::Human => {
                if todos.is_empty() {
                    println!("No todos found.");
                } else {
                    for todo in todos {
                        println!("{}", todo_line(todo));
                    }
                }
                println!("\n{}", items_left(active));
            }
            OutputFormat::Json => print_json(&todos),
            OutputFormat::Quiet => {
                for todo in todos {
                    println!("{}", todo.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr, even in quiet mode
    pub fn warning(&self, msg: &str) {
        match self.format {
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"status": "warning", "message": msg}));
            }
            _ => eprintln!("⚠ {}", msg),
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// One line per todo: `[x]  12 | Buy milk`
pub fn todo_line(todo: &Todo) -> String {
    format!(
        "{} {:>4} | {}",
        checkbox(todo.completed),
        todo.id.get(),
        truncate(&todo.title, 60)
    )
}

/// Row label for the TUI list, including the placeholder
pub fn task_label(task: &Task) -> String {
    match task {
        Task::Persisted(todo) => format!("{} {}", checkbox(todo.completed), todo.title),
        Task::Pending(pending) => format!("{} {} (saving...)", checkbox(false), pending.title),
    }
}

pub fn items_left(active: usize) -> String {
    match active {
        1 => "1 item left".to_string(),
        n => format!("{} items left", n),
    }
}

fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
