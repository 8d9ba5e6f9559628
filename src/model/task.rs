use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Urgency bucket derived from a task's due date relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Overdue,
    Today,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Derive the priority bucket from a due date.
    ///
    /// `diff_days` is the number of whole days until the due date, rounded
    /// up: a due date even one second into tomorrow counts as one day out.
    pub fn derive(due: DateTime<Utc>, now: DateTime<Utc>) -> Priority {
        let secs = (due - now).num_seconds();
        let diff_days = (secs + 86_399).div_euclid(86_400);
        match diff_days {
            d if d < 0 => Priority::Overdue,
            0 => Priority::Today,
            1..=2 => Priority::High,
            3..=7 => Priority::Medium,
            _ => Priority::Low,
        }
    }

    /// Sort rank: more urgent buckets sort first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Overdue => 0,
            Priority::Today => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Overdue => "overdue",
            Priority::Today => "today",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// The marker shown next to a task in listings.
    pub fn glyph(self) -> char {
        match self {
            Priority::Overdue => '!',
            Priority::Today => '●',
            Priority::High => '▲',
            Priority::Medium => '◆',
            Priority::Low => '·',
        }
    }
}

/// Named predicate selecting a subset of a user's tasks for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    #[default]
    All,
    Active,
    Completed,
    Important,
    DueToday,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::All,
        FilterKind::Active,
        FilterKind::Completed,
        FilterKind::Important,
        FilterKind::DueToday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::All => "all",
            FilterKind::Active => "active",
            FilterKind::Completed => "completed",
            FilterKind::Important => "important",
            FilterKind::DueToday => "due-today",
        }
    }

    /// Parse a filter name as given on the command line.
    pub fn parse(s: &str) -> Result<FilterKind, String> {
        match s {
            "all" => Ok(FilterKind::All),
            "active" => Ok(FilterKind::Active),
            "completed" => Ok(FilterKind::Completed),
            "important" => Ok(FilterKind::Important),
            "due-today" | "today" => Ok(FilterKind::DueToday),
            _ => Err(format!(
                "unknown filter '{}' (expected: all, active, completed, important, due-today)",
                s
            )),
        }
    }
}

/// A single to-do item owned by one user.
///
/// Serialized with camelCase keys; timestamps round-trip as ISO-8601
/// strings in the store file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque id, assigned at creation, never reused.
    pub id: Uuid,
    /// Per-user counter for display; not unique across deletions.
    pub display_number: u64,
    pub text: String,
    pub completed: bool,
    pub important: bool,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// Derived from `due_date`; not refreshed while completed.
    pub priority: Priority,
}

impl Task {
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Whether the due date falls on today's local calendar day.
    /// Completed tasks never count as due today.
    pub fn is_due_today(&self, now: DateTime<Utc>) -> bool {
        !self.completed
            && self.due_date.with_timezone(&Local).date_naive()
                == now.with_timezone(&Local).date_naive()
    }

    /// Re-derive `priority` against the given time.
    pub fn refresh_priority(&mut self, now: DateTime<Utc>) {
        self.priority = Priority::derive(self.due_date, now);
    }
}
