//! SQL data access layer for tasks.
//!
//! All methods take a `&Connection` parameter and are stateless, pure
//! translations between Rust types and SQL. Change notification and
//! pooling live one level up in [`crate::store::TaskStore`].

use rusqlite::{Connection, OptionalExtension, params};
use taskpad_core::task::{Task, TaskFilter};

use crate::errors::StoreError;

/// Task repository for SQL CRUD operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Insert a task and return its id.
    ///
    /// A task with `id = 0` gets a fresh autoincrement id. A task that
    /// already carries an id is written back under that id (replacing any
    /// existing row), which is how undo restores a deleted task without
    /// changing its identity.
    pub fn insert(conn: &Connection, task: &Task) -> Result<i64, StoreError> {
        if task.id == 0 {
            let _ = conn.execute(
                "INSERT INTO tasks (name, important, completed, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![task.name, task.important, task.completed, task.created_at],
            )?;
            Ok(conn.last_insert_rowid())
        } else {
            let _ = conn.execute(
                "INSERT OR REPLACE INTO tasks (id, name, important, completed, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task.id,
                    task.name,
                    task.important,
                    task.completed,
                    task.created_at
                ],
            )?;
            Ok(task.id)
        }
    }

    /// Get a task by id.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Task>, StoreError> {
        let task = conn
            .query_row(
                "SELECT id, name, important, completed, created_at \
                 FROM tasks WHERE id = ?1",
                params![id],
                Self::map_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Update a task in place. Returns true if a row was changed.
    pub fn update(conn: &Connection, task: &Task) -> Result<bool, StoreError> {
        let changed = conn.execute(
            "UPDATE tasks SET name = ?1, important = ?2, completed = ?3, created_at = ?4 \
             WHERE id = ?5",
            params![
                task.name,
                task.important,
                task.completed,
                task.created_at,
                task.id
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a task by id. Returns true if a row was deleted.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool, StoreError> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Delete all completed tasks. Returns the number of rows deleted.
    pub fn delete_completed(conn: &Connection) -> Result<usize, StoreError> {
        let changed = conn.execute("DELETE FROM tasks WHERE completed = 1", [])?;
        Ok(changed)
    }

    /// Count all tasks.
    pub fn count(conn: &Connection) -> Result<u32, StoreError> {
        let total: u32 = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(total)
    }

    /// List tasks matching a filter, in the filter's sort order.
    ///
    /// The name match is a substring `LIKE`, which folds case for ASCII the
    /// way the UI search box expects. An empty search matches every task.
    pub fn list(conn: &Connection, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if !filter.search.is_empty() {
            conditions.push("name LIKE '%' || ? || '%'".to_string());
            values.push(Box::new(filter.search.clone()));
        }
        if filter.hide_completed {
            conditions.push("completed = 0".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT id, name, important, completed, created_at FROM tasks \
             {where_clause} ORDER BY {}",
            filter.sort_order.as_order_by()
        );

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(Box::as_ref).collect();

        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_refs.as_slice(), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            name: row.get(1)?,
            important: row.get(2)?,
            completed: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
