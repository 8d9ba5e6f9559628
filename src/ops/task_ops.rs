use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::io::store_io::{self, ReadOutcome};
use crate::model::task::{Priority, Task};
use crate::model::user::Session;

/// Error type for task operations. Only validation failures are errors;
/// operating on an unknown id is a soft no-op, and persistence trouble is
/// surfaced as a non-blocking warning instead.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task text cannot be empty")]
    EmptyText,
    #[error("invalid due date '{0}' (expected YYYY-MM-DD or an RFC 3339 timestamp)")]
    InvalidDueDate(String),
}

/// The in-memory task collection for the active user.
///
/// Owns exactly one user's tasks for the lifetime of the session; every
/// mutation is followed by a full persist of the collection before the
/// caller sees success.
pub struct TaskStore {
    dir: PathBuf,
    username: String,
    tasks: Vec<Task>,
    next_display_number: u64,
    warning: Option<String>,
}

impl TaskStore {
    /// Load the persisted collection for the session's user. Absent data
    /// initializes an empty collection; corrupt data falls back to empty
    /// and records a warning. Never fails.
    pub fn load(dir: &Path, session: &Session) -> TaskStore {
        let mut warning = None;
        let outcome = store_io::read_users(dir);
        if matches!(outcome, ReadOutcome::Corrupt) {
            warning = Some("task store is unreadable; starting from an empty list".to_string());
        }
        let users = outcome.into_users();
        let mut tasks = users
            .get(&session.username)
            .map(|record| record.todos.clone())
            .unwrap_or_default();

        // Stored priorities go stale as time passes; bring non-completed
        // tasks back in line with the derivation rule.
        let now = Utc::now();
        for task in tasks.iter_mut().filter(|t| !t.completed) {
            task.refresh_priority(now);
        }

        let next_display_number = tasks
            .iter()
            .map(|t| t.display_number)
            .max()
            .unwrap_or(0)
            + 1;

        TaskStore {
            dir: dir.to_path_buf(),
            username: session.username.clone(),
            tasks,
            next_display_number,
            warning,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Add a task. Text trimming to empty is a validation failure and
    /// leaves the collection unchanged. Returns the created task.
    pub fn add(&mut self, text: &str, due: Option<DateTime<Utc>>) -> Result<Task, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }

        let now = Utc::now();
        let due_date = due.unwrap_or(now + Duration::days(1));
        let task = Task {
            id: Uuid::new_v4(),
            display_number: self.next_display_number,
            text: text.to_string(),
            completed: false,
            important: false,
            created_at: now,
            due_date,
            priority: Priority::derive(due_date, now),
        };
        self.next_display_number += 1;
        self.tasks.push(task.clone());
        self.persist();
        Ok(task)
    }

    /// Flip `completed`. Returns false (no-op) for an unknown id.
    ///
    /// Priority is recomputed only on the completed → not-completed
    /// transition; a task keeps its last-known urgency while completed.
    pub fn toggle_completed(&mut self, id: Uuid) -> bool {
        let now = Utc::now();
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        if !task.completed {
            task.refresh_priority(now);
        }
        self.persist();
        true
    }

    /// Flip `important`. No priority side effect.
    pub fn toggle_important(&mut self, id: Uuid) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.important = !task.important;
        self.persist();
        true
    }

    /// Remove the task with the given id. Returns false for an unknown id.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Resolve a display number (as shown by `list`) to a task.
    pub fn find_by_number(&self, number: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.display_number == number)
    }

    /// Take the pending warning, if any (corrupt load or failed persist).
    /// Surfaced by the caller as a non-blocking notification.
    pub fn take_warning(&mut self) -> Option<String> {
        self.warning.take()
    }

    /// Write the full collection back to the store. A failed write is
    /// retried once; if it still fails the in-memory state stays applied
    /// and a warning is recorded instead of rolling back.
    fn persist(&mut self) {
        let mut users = store_io::read_users(&self.dir).into_users();
        let Some(record) = users.get_mut(&self.username) else {
            self.warning = Some(format!(
                "no stored record for '{}'; changes are not saved",
                self.username
            ));
            return;
        };
        record.todos = self.tasks.clone();

        if store_io::write_users(&self.dir, &users).is_err()
            && let Err(e) = store_io::write_users(&self.dir, &users)
        {
            self.warning = Some(format!("could not save tasks: {}", e));
        }
    }
}

/// Parse a due date given on the command line. A bare `YYYY-MM-DD` means
/// end of that local day, so a task due "today" stays in the today bucket
/// until midnight. Full RFC 3339 timestamps are taken verbatim.
pub fn parse_due_date(s: &str) -> Result<DateTime<Utc>, TaskError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| TaskError::InvalidDueDate(s.to_string()))?;
    let end_of_day = date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| TaskError::InvalidDueDate(s.to_string()))?;
    let local = Local
        .from_local_datetime(&end_of_day)
        .earliest()
        .ok_or_else(|| TaskError::InvalidDueDate(s.to_string()))?;
    Ok(local.with_timezone(&Utc))
}
