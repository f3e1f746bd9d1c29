use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::Database;
use crate::models::{
    ClearSummary, NewTask, NotificationRow, RatingRow, TaskRow, format_timestamp,
};

impl Database {
    // -- Rating --

    pub fn get_rating(&self, user_id: u32) -> Result<Option<RatingRow>> {
        self.with_conn(|conn| query_rating(conn, user_id))
    }

    /// Find-or-create the user's rating row, then overwrite its value.
    pub fn set_rating(&self, user_id: u32, value: f64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM user_rating WHERE user_id = ?1 ORDER BY id LIMIT 1",
                    [user_id],
                    |row| row.get(0),
                )
                .optional()?;

            let id = match existing {
                Some(id) => id,
                None => {
                    tx.execute("INSERT INTO user_rating (user_id) VALUES (?1)", [user_id])?;
                    tx.last_insert_rowid()
                }
            };

            tx.execute(
                "UPDATE user_rating SET value = ?1 WHERE id = ?2",
                rusqlite::params![value, id],
            )?;
            tx.commit()?;

            debug!("Rating for user {} set to {}", user_id, value);
            Ok(())
        })
    }

    // -- Notifications --

    pub fn insert_notification(
        &self,
        user_id: u32,
        subject: &str,
        body: &str,
        created: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO notification (user_id, subject, body, created) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![user_id, subject, body, format_timestamp(created)],
            )?;
            let id = conn.last_insert_rowid();
            debug!("Notification {} stored for user {}", id, user_id);
            Ok(id)
        })
    }

    /// Newest first.
    pub fn list_notifications(&self, user_id: u32, limit: u32) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, subject, body, created
                 FROM notification
                 WHERE user_id = ?1
                 ORDER BY created DESC, id DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], |row| {
                    Ok(NotificationRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        subject: row.get(2)?,
                        body: row.get(3)?,
                        created: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Tasks --

    /// Insert the task unless the user already has one with the same external
    /// id. Returns whether a row was inserted.
    ///
    /// The existence check and the insert are one statement, so two
    /// concurrent assigns can't both see the task as absent. There is no
    /// unique index; duplicates written by older versions are left alone.
    pub fn assign_task(&self, task: &NewTask<'_>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO task (user_id, task_id, title, url, status, created)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6
                 WHERE NOT EXISTS (
                     SELECT 1 FROM task WHERE user_id = ?1 AND task_id = ?2
                 )",
                rusqlite::params![
                    task.user_id,
                    task.task_id,
                    task.title,
                    task.url,
                    task.status,
                    format_timestamp(task.created),
                ],
            )?;
            debug!(
                "Assign task {} for user {}: {}",
                task.task_id,
                task.user_id,
                if inserted == 1 { "inserted" } else { "already present" }
            );
            Ok(inserted == 1)
        })
    }

    /// Returns the number of rows removed; zero when the task is unknown.
    pub fn unassign_task(&self, user_id: u32, task_id: u32) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute(
                "DELETE FROM task WHERE user_id = ?1 AND task_id = ?2",
                rusqlite::params![user_id, task_id],
            )?;
            debug!("Unassign task {} for user {}: {} row(s)", task_id, user_id, removed);
            Ok(removed)
        })
    }

    pub fn set_task_status(&self, user_id: u32, task_id: u32, status: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE task SET status = ?3 WHERE user_id = ?1 AND task_id = ?2",
                rusqlite::params![user_id, task_id, status],
            )?;
            debug!(
                "Task {} for user {} -> '{}': {} row(s)",
                task_id, user_id, status, updated
            );
            Ok(updated)
        })
    }

    /// Newest first.
    pub fn list_tasks(&self, user_id: u32, limit: u32) -> Result<Vec<TaskRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, task_id, title, url, status, created
                 FROM task
                 WHERE user_id = ?1
                 ORDER BY created DESC, id DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], task_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Clear --

    /// Remove the user's rating, notifications and tasks in one transaction.
    pub fn clear_user(&self, user_id: u32) -> Result<ClearSummary> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let summary = ClearSummary {
                ratings: tx.execute("DELETE FROM user_rating WHERE user_id = ?1", [user_id])?,
                notifications: tx
                    .execute("DELETE FROM notification WHERE user_id = ?1", [user_id])?,
                tasks: tx.execute("DELETE FROM task WHERE user_id = ?1", [user_id])?,
            };
            tx.commit()?;
            debug!("Cleared user {}: {:?}", user_id, summary);
            Ok(summary)
        })
    }
}

fn query_rating(conn: &Connection, user_id: u32) -> Result<Option<RatingRow>> {
    let mut stmt = conn
        .prepare("SELECT id, user_id, value FROM user_rating WHERE user_id = ?1 ORDER BY id LIMIT 1")?;

    let row = stmt
        .query_row([user_id], |row| {
            Ok(RatingRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                value: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        task_id: row.get(2)?,
        title: row.get(3)?,
        url: row.get(4)?,
        status: row.get(5)?,
        created: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const USER: u32 = 12;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn new_task(task_id: u32, title: &str) -> NewTask<'_> {
        NewTask {
            user_id: USER,
            task_id,
            title,
            url: "https://tracker.example/t",
            status: "assigned",
            created: Utc::now(),
        }
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    #[test]
    fn test_set_rating_creates_then_updates_single_row() {
        let db = db();
        assert!(db.get_rating(USER).unwrap().is_none());

        db.set_rating(USER, 4.5).unwrap();
        db.set_rating(USER, 4.5).unwrap();
        db.set_rating(USER, 4.5).unwrap();
        assert_eq!(count(&db, "user_rating"), 1);
        assert_eq!(db.get_rating(USER).unwrap().unwrap().value, 4.5);

        db.set_rating(USER, 2.0).unwrap();
        assert_eq!(count(&db, "user_rating"), 1);
        assert_eq!(db.get_rating(USER).unwrap().unwrap().value, 2.0);
    }

    #[test]
    fn test_negative_rating_is_rejected() {
        let db = db();
        assert!(db.set_rating(USER, -1.0).is_err());
        assert!(db.get_rating(USER).unwrap().is_none());
    }

    #[test]
    fn test_notifications_newest_first_and_limited() {
        let db = db();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        for i in 0..5 {
            db.insert_notification(USER, &format!("s{}", i), "b", base + Duration::minutes(i))
                .unwrap();
        }
        db.insert_notification(99, "other", "b", base).unwrap();

        let rows = db.list_notifications(USER, 3).unwrap();
        let subjects: Vec<_> = rows.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["s4", "s3", "s2"]);
    }

    #[test]
    fn test_same_timestamp_orders_by_id() {
        let db = db();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let first = db.insert_notification(USER, "first", "", ts).unwrap();
        let second = db.insert_notification(USER, "second", "", ts).unwrap();

        let ids: Vec<_> = db.list_notifications(USER, 10).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_assign_twice_keeps_first() {
        let db = db();
        assert!(db.assign_task(&new_task(7, "original")).unwrap());
        assert!(!db.assign_task(&new_task(7, "replacement")).unwrap());

        let tasks = db.list_tasks(USER, 10).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "original");
        assert_eq!(tasks[0].status, "assigned");
    }

    #[test]
    fn test_concurrent_assign_inserts_once() {
        let db = db();
        let barrier = std::sync::Barrier::new(8);

        let inserted = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        db.assign_task(&new_task(21, "race")).unwrap()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|inserted| *inserted)
                .count()
        });

        assert_eq!(inserted, 1);
        assert_eq!(count(&db, "task"), 1);
    }

    #[test]
    fn test_same_external_id_for_other_user_is_separate() {
        let db = db();
        db.assign_task(&new_task(7, "mine")).unwrap();
        db.assign_task(&NewTask { user_id: 99, ..new_task(7, "theirs") }).unwrap();
        assert_eq!(count(&db, "task"), 2);
        assert_eq!(db.list_tasks(USER, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_change_status_and_unassign() {
        let db = db();
        db.assign_task(&new_task(7, "t")).unwrap();

        assert_eq!(db.set_task_status(USER, 7, "in_review").unwrap(), 1);
        assert_eq!(db.list_tasks(USER, 10).unwrap()[0].status, "in_review");

        assert_eq!(db.unassign_task(USER, 7).unwrap(), 1);
        assert!(db.list_tasks(USER, 10).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_task_mutations_are_noops() {
        let db = db();
        assert_eq!(db.unassign_task(USER, 404).unwrap(), 0);
        assert_eq!(db.set_task_status(USER, 404, "done").unwrap(), 0);
        assert_eq!(count(&db, "task"), 0);
    }

    #[test]
    fn test_clear_user_only_touches_that_user() {
        let db = db();
        db.set_rating(USER, 3.0).unwrap();
        db.insert_notification(USER, "s", "b", Utc::now()).unwrap();
        db.insert_notification(USER, "s2", "b", Utc::now()).unwrap();
        db.assign_task(&new_task(1, "t")).unwrap();
        db.set_rating(99, 1.0).unwrap();

        let summary = db.clear_user(USER).unwrap();
        assert_eq!(
            summary,
            ClearSummary { ratings: 1, notifications: 2, tasks: 1 }
        );
        assert!(db.get_rating(USER).unwrap().is_none());
        assert!(db.list_notifications(USER, 10).unwrap().is_empty());
        assert!(db.list_tasks(USER, 10).unwrap().is_empty());
        assert!(db.get_rating(99).unwrap().is_some());
    }
}
