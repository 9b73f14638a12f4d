//! # taskpad-settings
//!
//! Persisted view preferences for the Taskpad to-do core.
//!
//! [`PreferencesManager`] owns one small JSON file holding the current
//! [`FilterPreferences`] (sort rule plus the hide-completed flag) and a
//! watch channel that broadcasts every committed change. Reads are
//! infallible: a missing file yields defaults silently, an unreadable or
//! corrupt file yields defaults with a warning. Writes go through to disk
//! first; the published in-memory value only advances after the file write
//! succeeds.
//!
//! The manager is a plain value meant to be constructed once and shared
//! behind an `Arc`, so tests can point each instance at its own file.

#![deny(unsafe_code)]

pub mod errors;

pub use errors::{PreferencesError, Result};

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use taskpad_core::task::{FilterPreferences, SortOrder};

/// Resolve the default preferences path (`~/.taskpad/preferences.json`).
#[must_use]
pub fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".taskpad").join("preferences.json")
}

/// Owner of the preferences file and its change feed.
pub struct PreferencesManager {
    path: PathBuf,
    tx: watch::Sender<FilterPreferences>,
    // Updates are read-modify-write over one file; serialize them
    write_lock: Mutex<()>,
}

impl PreferencesManager {
    /// Load preferences from `path`, falling back to defaults if the file
    /// is missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs = read_preferences(&path).unwrap_or_else(|err| {
            warn!(?path, error = %err, "unreadable preferences file, using defaults");
            FilterPreferences::default()
        });
        let (tx, _) = watch::channel(prefs);
        Self {
            path,
            tx,
            write_lock: Mutex::new(()),
        }
    }

    /// The file this manager persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current preferences value.
    #[must_use]
    pub fn current(&self) -> FilterPreferences {
        *self.tx.borrow()
    }

    /// Subscribe to preference changes.
    ///
    /// The receiver starts with the current value marked seen; it wakes
    /// once per committed update.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FilterPreferences> {
        self.tx.subscribe()
    }

    /// Change the sort rule and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file write fails; the published value is
    /// left unchanged in that case.
    pub fn update_sort_order(&self, sort_order: SortOrder) -> Result<()> {
        self.commit(|prefs| prefs.sort_order = sort_order)
    }

    /// Change the hide-completed flag and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file write fails; the published value is
    /// left unchanged in that case.
    pub fn update_hide_completed(&self, hide_completed: bool) -> Result<()> {
        self.commit(|prefs| prefs.hide_completed = hide_completed)
    }

    fn commit(&self, mutate: impl FnOnce(&mut FilterPreferences)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut prefs = self.current();
        mutate(&mut prefs);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&prefs)?;
        std::fs::write(&self.path, json)?;
        debug!(path = ?self.path, ?prefs, "preferences persisted");
        let _ = self.tx.send_replace(prefs);
        Ok(())
    }
}

fn read_preferences(path: &Path) -> Result<FilterPreferences> {
    if !path.exists() {
        debug!(?path, "preferences file not found, using defaults");
        return Ok(FilterPreferences::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn manager_in(dir: &tempfile::TempDir) -> PreferencesManager {
        PreferencesManager::load(dir.path().join("preferences.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        assert_eq!(manager.current(), FilterPreferences::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not valid json").unwrap();

        let manager = PreferencesManager::load(&path);
        assert_eq!(manager.current(), FilterPreferences::default());
    }

    #[test]
    fn partial_file_fills_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"hideCompleted":true}"#).unwrap();

        let manager = PreferencesManager::load(&path);
        assert!(manager.current().hide_completed);
        assert_eq!(manager.current().sort_order, SortOrder::ByDate);
    }

    #[test]
    fn updates_persist_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let manager = PreferencesManager::load(&path);
        manager.update_sort_order(SortOrder::ByName).unwrap();
        manager.update_hide_completed(true).unwrap();

        let reloaded = PreferencesManager::load(&path);
        assert_eq!(reloaded.current().sort_order, SortOrder::ByName);
        assert!(reloaded.current().hide_completed);
    }

    #[test]
    fn update_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs").join("preferences.json");

        let manager = PreferencesManager::load(&path);
        manager.update_hide_completed(true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn update_keeps_other_field() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);

        manager.update_sort_order(SortOrder::ByName).unwrap();
        manager.update_hide_completed(true).unwrap();

        let prefs = manager.current();
        assert_eq!(prefs.sort_order, SortOrder::ByName);
        assert!(prefs.hide_completed);
    }

    #[test]
    fn failed_write_leaves_value_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // The path is a directory, so the write must fail
        let manager = PreferencesManager::load(dir.path());

        let result = manager.update_hide_completed(true);
        assert!(result.is_err());
        assert!(!manager.current().hide_completed);
    }

    #[tokio::test]
    async fn concurrent_updates_lose_neither_field() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(manager_in(&dir));

        let sort = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.update_sort_order(SortOrder::ByName) })
        };
        let hide = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.update_hide_completed(true) })
        };
        sort.await.unwrap().unwrap();
        hide.await.unwrap().unwrap();

        let prefs = manager.current();
        assert_eq!(prefs.sort_order, SortOrder::ByName);
        assert!(prefs.hide_completed);

        let reloaded = PreferencesManager::load(manager.path());
        assert_eq!(reloaded.current(), prefs);
    }

    #[tokio::test]
    async fn subscribers_wake_on_update() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        let mut rx = manager.subscribe();

        manager.update_sort_order(SortOrder::ByName).unwrap();

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("timed out waiting for preference change")
            .expect("preferences channel closed");
        assert_eq!(rx.borrow_and_update().sort_order, SortOrder::ByName);
    }

    #[test]
    fn subscriber_starts_with_current_value() {
        let dir = tempfile::tempdir().unwrap();
        let manager = manager_in(&dir);
        manager.update_hide_completed(true).unwrap();

        let rx = manager.subscribe();
        assert!(rx.borrow().hide_completed);
    }

    #[test]
    fn default_path_ends_with_preferences_file() {
        let path = default_path();
        assert!(path.ends_with(".taskpad/preferences.json"));
    }
}
