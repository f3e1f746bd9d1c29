use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to a task when the assign request doesn't carry one.
pub const DEFAULT_TASK_STATUS: &str = "assigned";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: u32,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A tracked task. `task_id` is the identifier assigned by the external
/// tracker; `id` is ours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: u32,
    pub task_id: u32,
    pub title: String,
    pub url: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
