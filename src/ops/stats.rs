use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::Task;

/// Counts over the full (unfiltered) collection for the active user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub important: usize,
    pub due_today: usize,
}

/// Compute stat counts. Predicates match the filter engine's definitions,
/// so `active + completed == total` always holds.
pub fn compute_stats(tasks: &[Task], now: DateTime<Utc>) -> Stats {
    Stats {
        total: tasks.len(),
        active: tasks.iter().filter(|t| t.is_active()).count(),
        completed: tasks.iter().filter(|t| t.completed).count(),
        important: tasks.iter().filter(|t| t.important).count(),
        due_today: tasks.iter().filter(|t| t.is_due_today(now)).count(),
    }
}
