use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// The persisted users mapping, username → record, in registration order.
pub type Users = IndexMap<String, UserRecord>;

/// One user's record in the store: credentials plus the complete current
/// set of their tasks (full overwrite semantics on every persist).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// hex(sha256(salt ‖ password))
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub todos: Vec<Task>,
}

/// The active session, persisted separately for continuity across runs.
/// Credentials are never duplicated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    #[serde(default)]
    pub email: String,
}
