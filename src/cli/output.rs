use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::model::task::{Priority, Task};
use crate::model::user::Session;
use crate::ops::stats::Stats;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub number: u64,
    pub text: String,
    pub completed: bool,
    pub important: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub user: String,
    pub filter: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct SessionJson {
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        number: task.display_number,
        text: task.text.clone(),
        completed: task.completed,
        important: task.important,
        priority: task.priority,
        created_at: task.created_at,
        due_date: task.due_date,
    }
}

pub fn session_to_json(session: &Session) -> SessionJson {
    SessionJson {
        username: session.username.clone(),
        email: session.email.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary:
/// `[x]  3  ▲ Buy milk            due 2026-08-31 ★`
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let star = if task.important { " ★" } else { "" };
    let due = task.due_date.with_timezone(&Local).format("%Y-%m-%d");
    format!(
        "[{}] {:>3}  {} {}  due {}{}",
        check,
        task.display_number,
        task.priority.glyph(),
        task.text,
        due,
        star
    )
}

/// Format the stats summary, one count per line.
pub fn format_stats(stats: &Stats) -> Vec<String> {
    vec![
        format!("total:      {}", stats.total),
        format!("active:     {}", stats.active),
        format!("completed:  {}", stats.completed),
        format!("important:  {}", stats.important),
        format!("due today:  {}", stats.due_today),
    ]
}
