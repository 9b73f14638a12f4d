//! High-level task store with live query subscriptions.
//!
//! [`TaskStore`] owns the connection pool plus a broadcast change feed.
//! Every successful write sends a change tick; a [`TaskWatch`] created by
//! [`TaskStore::watch`] re-runs its query on every tick, so subscribers
//! always converge on the current contents of the database.

use std::path::Path;

use tokio::sync::broadcast;
use tracing::{debug, info};

use taskpad_core::task::{Task, TaskFilter};

use crate::connection::{self, ConnectionConfig, ConnectionPool};
use crate::errors::Result;
use crate::migrations::run_migrations;
use crate::repository::TaskRepository;

/// Capacity of the change feed. Watchers that fall further behind than
/// this coalesce the missed ticks into a single re-query.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// `SQLite`-backed task store.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct TaskStore {
    pool: ConnectionPool,
    changes: broadcast::Sender<()>,
}

impl TaskStore {
    /// Open (or create) a file-backed store with default pool settings.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_config(path, &ConnectionConfig::default())
    }

    /// Open (or create) a file-backed store with custom pool settings.
    pub fn open_with_config(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        Self::from_pool(connection::new_file(path, config)?)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::from_pool(connection::new_in_memory(&ConnectionConfig::default())?)
    }

    fn from_pool(pool: ConnectionPool) -> Result<Self> {
        {
            let conn = pool.get()?;
            run_migrations(&conn)?;
        }
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self { pool, changes })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────

    /// Insert a task and return its store-assigned id.
    ///
    /// A task carrying a nonzero id keeps it, which is how an undo
    /// re-insert restores the original identity.
    pub fn insert(&self, task: &Task) -> Result<i64> {
        let conn = self.pool.get()?;
        let id = TaskRepository::insert(&conn, task)?;
        debug!(id, name = %task.name, "task inserted");
        self.notify();
        Ok(id)
    }

    /// Update a task in place. Returns true if a row was changed.
    pub fn update(&self, task: &Task) -> Result<bool> {
        let conn = self.pool.get()?;
        let changed = TaskRepository::update(&conn, task)?;
        if changed {
            debug!(id = task.id, "task updated");
            self.notify();
        }
        Ok(changed)
    }

    /// Delete a task. Returns true if a row was deleted.
    pub fn delete(&self, task: &Task) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = TaskRepository::delete(&conn, task.id)?;
        if deleted {
            debug!(id = task.id, "task deleted");
            self.notify();
        }
        Ok(deleted)
    }

    /// Delete all completed tasks. Returns the number of rows deleted.
    pub fn delete_completed_tasks(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let deleted = TaskRepository::delete_completed(&conn)?;
        if deleted > 0 {
            debug!(deleted, "completed tasks deleted");
            self.notify();
        }
        Ok(deleted)
    }

    /// Insert the stock demo tasks into an empty store.
    ///
    /// Does nothing when any task already exists. Returns the number of
    /// tasks inserted.
    pub fn seed_demo_tasks(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        if TaskRepository::count(&conn)? > 0 {
            return Ok(0);
        }
        let seeds = demo_tasks();
        for task in &seeds {
            let _ = TaskRepository::insert(&conn, task)?;
        }
        info!(count = seeds.len(), "seeded demo tasks");
        self.notify();
        Ok(seeds.len())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────

    /// Get a task by id.
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.pool.get()?;
        TaskRepository::get(&conn, id)
    }

    /// Run a one-shot query for the tasks matching `filter`.
    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.pool.get()?;
        TaskRepository::list(&conn, filter)
    }

    /// Subscribe to the tasks matching `filter`.
    ///
    /// The returned watch emits the current result immediately, then
    /// re-emits after every store change. The subscription is registered
    /// before the first query runs, so a write racing the first emission
    /// produces a tick instead of being missed.
    #[must_use]
    pub fn watch(&self, filter: TaskFilter) -> TaskWatch {
        TaskWatch {
            pool: self.pool.clone(),
            filter,
            changes: self.changes.subscribe(),
            primed: false,
        }
    }

    fn notify(&self) {
        // No receivers is fine; watchers come and go with the UI
        let _ = self.changes.send(());
    }
}

/// A live subscription to one task query.
///
/// Dropping the watch cancels the subscription. Created by
/// [`TaskStore::watch`]; the filter is fixed for the lifetime of the
/// watch, so "the query changed" means dropping this one and creating
/// another.
pub struct TaskWatch {
    pool: ConnectionPool,
    filter: TaskFilter,
    changes: broadcast::Receiver<()>,
    primed: bool,
}

impl TaskWatch {
    /// Wait for the next emission.
    ///
    /// The first call emits the current query result without waiting.
    /// Returns `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Result<Vec<Task>>> {
        if self.primed {
            loop {
                match self.changes.recv().await {
                    Ok(()) => break,
                    // Missed ticks collapse into the single re-query below
                    Err(broadcast::error::RecvError::Lagged(_)) => break,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }
        self.primed = true;
        Some(self.run_query())
    }

    /// The filter this watch was created with.
    #[must_use]
    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    fn run_query(&self) -> Result<Vec<Task>> {
        let conn = self.pool.get()?;
        TaskRepository::list(&conn, &self.filter)
    }
}

/// The stock demo task set for a fresh database.
fn demo_tasks() -> Vec<Task> {
    vec![
        Task::new("买水果", false),
        Task::new("洗澡", false),
        Task::new("唱歌", false),
        Task::new("去颐和园", true),
        Task {
            completed: true,
            ..Task::new("冥想", false)
        },
        Task::new("去快递", false),
        Task::new("to the moon", false),
        Task::new("fly to berlin", false),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
