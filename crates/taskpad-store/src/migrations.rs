//! SQL DDL for the tasks table.
//!
//! One table holds everything the to-do list needs. `id` is the SQLite
//! rowid; AUTOINCREMENT keeps deleted ids from being reused, so an undo
//! re-insert with an explicit id restores the original row identity.

use rusqlite::Connection;

use crate::errors::Result;

/// Run all task store migrations.
///
/// Idempotent: safe to call multiple times (uses `IF NOT EXISTS`).
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(TASKS_SCHEMA)?;
    Ok(())
}

/// DDL for the tasks table and its indexes.
const TASKS_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    important INTEGER NOT NULL DEFAULT 0,
    completed INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_name
    ON tasks(name);
CREATE INDEX IF NOT EXISTS idx_tasks_completed_created
    ON tasks(completed, important, created_at);
";

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
