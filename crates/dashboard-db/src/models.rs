//! Database row types. These map directly to SQLite rows and are converted to
//! the `dashboard-types` models at the edge.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

use dashboard_types::models::{Notification, Rating, Task};

pub struct RatingRow {
    pub id: i64,
    pub user_id: u32,
    pub value: f64,
}

pub struct NotificationRow {
    pub id: i64,
    pub user_id: u32,
    pub subject: String,
    pub body: String,
    pub created: String,
}

pub struct TaskRow {
    pub id: i64,
    pub user_id: u32,
    pub task_id: u32,
    pub title: String,
    pub url: String,
    pub status: String,
    pub created: String,
}

pub struct NewTask<'a> {
    pub user_id: u32,
    pub task_id: u32,
    pub title: &'a str,
    pub url: &'a str,
    pub status: &'a str,
    pub created: DateTime<Utc>,
}

/// Rows removed by `Database::clear_user`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClearSummary {
    pub ratings: usize,
    pub notifications: usize,
    pub tasks: usize,
}

/// Millisecond RFC 3339 in UTC, so string order is time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone. Treat it as UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}

fn created_or_default(raw: &str, table: &str, id: i64) -> DateTime<Utc> {
    parse_timestamp(raw).unwrap_or_else(|| {
        warn!("Corrupt created '{}' on {} '{}'", raw, table, id);
        DateTime::default()
    })
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            user_id: row.user_id,
            value: row.value,
        }
    }
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        let created_at = created_or_default(&row.created, "notification", row.id);
        Notification {
            id: row.id,
            user_id: row.user_id,
            subject: row.subject,
            body: row.body,
            created_at,
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let created_at = created_or_default(&row.created, "task", row.id);
        Task {
            id: row.id,
            user_id: row.user_id,
            task_id: row.task_id,
            title: row.title,
            url: row.url,
            status: row.status,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_formats_sort_lexically() {
        let early = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(early) < format_timestamp(late));
    }

    #[test]
    fn test_parse_accepts_sqlite_datetime() {
        let parsed = parse_timestamp("2024-01-02 03:04:05").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn test_parse_round_trips_own_format() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(ts)), Some(ts));
    }

    #[test]
    fn test_corrupt_created_falls_back() {
        let task: Task = TaskRow {
            id: 1,
            user_id: 12,
            task_id: 3,
            title: String::new(),
            url: String::new(),
            status: "assigned".into(),
            created: "yesterday".into(),
        }
        .into();
        assert_eq!(task.created_at, DateTime::<Utc>::default());
    }
}
