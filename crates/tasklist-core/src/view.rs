//! View projection
//!
//! Derives the read-only rows shown for a filter mode. Projection is a pure
//! function of the store contents and the filter; it never mutates state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Task;
use crate::store::TodoStore;

/// Which todos to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    /// Whether a persisted todo with this completion state is shown
    pub fn admits(self, completed: bool) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !completed,
            Filter::Completed => completed,
        }
    }

    /// Next tab (wrapping)
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    /// Previous tab (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Filter::All => Filter::Completed,
            Filter::Active => Filter::All,
            Filter::Completed => Filter::Active,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        };
        f.write_str(name)
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(format!(
                "Unknown filter '{}'. Use all, active or completed.",
                other
            )),
        }
    }
}

/// Rows for `filter`, in store order
///
/// The pending placeholder is shown under every filter while a create is
/// in flight.
pub fn project(store: &TodoStore, filter: Filter) -> Vec<Task> {
    store
        .tasks()
        .filter(|task| task.is_pending() || filter.admits(task.completed()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PendingTodo, Title, UserId};
    use crate::remote::fake::todo;

    fn store() -> TodoStore {
        let mut store = TodoStore::new();
        store.replace_all(vec![
            todo(1, "one", false),
            todo(2, "two", true),
            todo(3, "three", false),
        ]);
        store
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(Task::title).collect()
    }

    #[test]
    fn test_project_all() {
        assert_eq!(titles(&project(&store(), Filter::All)), ["one", "two", "three"]);
    }

    #[test]
    fn test_project_active() {
        assert_eq!(titles(&project(&store(), Filter::Active)), ["one", "three"]);
    }

    #[test]
    fn test_project_completed() {
        let rows = project(&store(), Filter::Completed);
        assert_eq!(titles(&rows), ["two"]);
        assert!(rows.iter().all(Task::completed));
    }

    #[test]
    fn test_pending_shown_under_every_filter() {
        let mut store = store();
        store.begin_pending(PendingTodo::new(UserId(1), &Title::parse("new").unwrap()));

        for filter in Filter::ALL {
            let rows = project(&store, filter);
            assert!(rows.last().unwrap().is_pending(), "filter {}", filter);
        }
    }

    #[test]
    fn test_projection_does_not_mutate() {
        let store = store();
        let before = store.todos().to_vec();
        let _ = project(&store, Filter::Completed);
        assert_eq!(store.todos(), before.as_slice());
    }

    #[test]
    fn test_filter_parse_and_display() {
        for filter in Filter::ALL {
            assert_eq!(filter.to_string().parse::<Filter>().unwrap(), filter);
        }
        assert_eq!(" Active ".parse::<Filter>().unwrap(), Filter::Active);
        assert!("done".parse::<Filter>().is_err());
    }

    #[test]
    fn test_filter_cycles() {
        assert_eq!(Filter::All.next(), Filter::Active);
        assert_eq!(Filter::Completed.next(), Filter::All);
        assert_eq!(Filter::All.prev(), Filter::Completed);
    }
}
