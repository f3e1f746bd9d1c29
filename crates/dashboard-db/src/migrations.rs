use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Ordered schema steps. A step runs once; its version is recorded in
/// `schema_version` in the same transaction.
const MIGRATIONS: &[(i64, &str, &str)] = &[
    (
        1,
        "initial schema",
        "
        CREATE TABLE IF NOT EXISTS user_rating (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL CHECK (user_id >= 0),
            value       REAL NOT NULL DEFAULT 0 CHECK (value >= 0)
        );

        CREATE INDEX IF NOT EXISTS idx_user_rating_user
            ON user_rating(user_id);

        CREATE TABLE IF NOT EXISTS notification (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL CHECK (user_id >= 0),
            subject     TEXT NOT NULL DEFAULT '',
            body        TEXT NOT NULL DEFAULT '',
            created     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notification_user
            ON notification(user_id, created);

        -- (user_id, task_id) is unique by convention only, see Database::assign_task
        CREATE TABLE IF NOT EXISTS task (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL CHECK (user_id >= 0),
            task_id     INTEGER NOT NULL CHECK (task_id >= 0),
            title       TEXT NOT NULL DEFAULT '',
            url         TEXT NOT NULL DEFAULT '',
            created     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_task_user
            ON task(user_id, task_id);
        ",
    ),
    (
        2,
        "task status",
        "ALTER TABLE task ADD COLUMN status TEXT NOT NULL DEFAULT 'assigned';",
    ),
    (
        3,
        "rfc3339 timestamps",
        // `created` is ordered as text, so space-separated datetime('now')
        // values must share the format written by models::format_timestamp.
        "
        UPDATE notification
            SET created = strftime('%Y-%m-%dT%H:%M:%fZ', created)
            WHERE created GLOB '????-??-?? ??:??:??*'
              AND strftime('%Y-%m-%dT%H:%M:%fZ', created) IS NOT NULL;

        UPDATE task
            SET created = strftime('%Y-%m-%dT%H:%M:%fZ', created)
            WHERE created GLOB '????-??-?? ??:??:??*'
              AND strftime('%Y-%m-%dT%H:%M:%fZ', created) IS NOT NULL;
        ",
    ),
];

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let current = current_version(conn)?;

    for &(version, name, sql) in MIGRATIONS.iter().filter(|(v, _, _)| *v > current) {
        info!("Running migration v{} ({})", version, name);
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("migration v{} ({}) failed", version, name))?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
        tx.commit()?;
    }

    info!("Database migrations complete (schema v{})", latest_version());
    Ok(())
}

pub fn current_version(conn: &Connection) -> Result<i64> {
    let version =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;
    Ok(version)
}

pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|(v, _, _)| *v).unwrap_or(0)
}
