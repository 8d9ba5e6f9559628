use chrono::{DateTime, Utc};

use crate::model::task::{FilterKind, Task};

/// Produce the ordered view for display: select by filter kind, then sort.
///
/// Sort order is a total order, stable for equal keys: primary key is the
/// priority rank (overdue first), secondary key the due date ascending.
/// Recomputed on every render, never persisted.
pub fn filtered_view(tasks: &[Task], filter: FilterKind, now: DateTime<Utc>) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|t| matches_filter(t, filter, now))
        .collect();
    view.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then(a.due_date.cmp(&b.due_date))
    });
    view
}

/// The selection predicate for one filter kind.
pub fn matches_filter(task: &Task, filter: FilterKind, now: DateTime<Utc>) -> bool {
    match filter {
        FilterKind::All => true,
        FilterKind::Active => task.is_active(),
        FilterKind::Completed => task.completed,
        FilterKind::Important => task.important,
        FilterKind::DueToday => task.is_due_today(now),
    }
}
