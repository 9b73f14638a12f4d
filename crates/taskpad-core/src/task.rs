//! Task data model and query vocabulary.
//!
//! [`Task`] is the single persisted entity. [`SortOrder`] and
//! [`FilterPreferences`] describe how the visible list is ordered and
//! filtered; [`TaskFilter`] bundles them with the current search text into
//! the parameters of one store query.
//!
//! Wire shape (JSON for the iOS shell) uses camelCase field names and
//! snake_case enum values.

use serde::{Deserialize, Serialize};

/// Current UTC time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A to-do item.
///
/// `id = 0` means the task has not been persisted yet; the store assigns a
/// row id on first insert. A task that already carries a nonzero id keeps
/// it when re-inserted, which is what makes undo-after-delete restore the
/// same identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Row id. `0` until first persisted.
    #[serde(default)]
    pub id: i64,
    /// Display name. Non-empty once saved.
    pub name: String,
    /// Important tasks sort before others under [`SortOrder::ByDate`].
    #[serde(default)]
    pub important: bool,
    /// Completion flag.
    #[serde(default)]
    pub completed: bool,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Create an unsaved task stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, important: bool) -> Self {
        Self {
            id: 0,
            name: name.into(),
            important,
            completed: false,
            created_at: now_millis(),
        }
    }

    /// Whether this task has been persisted (has a store-assigned id).
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id != 0
    }

    /// Creation time rendered for display, e.g. `2026-08-25 14:03`.
    ///
    /// Falls back to the raw millisecond value if the timestamp is outside
    /// chrono's representable range.
    #[must_use]
    pub fn created_date_formatted(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.created_at).map_or_else(
            || self.created_at.to_string(),
            |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
        )
    }
}

/// Sort rule for the visible task list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Name ascending (binary collation, so code-point order).
    ByName,
    /// Important first, then newest first.
    #[default]
    ByDate,
}

impl SortOrder {
    /// Stable string form, matching the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByName => "by_name",
            Self::ByDate => "by_date",
        }
    }

    /// The ORDER BY clause this sort rule translates to.
    ///
    /// `id DESC` breaks ties between rows created in the same millisecond.
    #[must_use]
    pub fn as_order_by(self) -> &'static str {
        match self {
            Self::ByName => "name ASC",
            Self::ByDate => "important DESC, created_at DESC, id DESC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted view preferences: sort rule plus the hide-completed flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterPreferences {
    /// Current sort rule.
    pub sort_order: SortOrder,
    /// When set, completed tasks are excluded from the visible list.
    pub hide_completed: bool,
}

/// Parameters of one store query: search text plus the current preferences.
///
/// The visible list is a pure function of these values and the underlying
/// task set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring to match against task names. Empty
    /// matches everything.
    pub search: String,
    /// Sort rule.
    pub sort_order: SortOrder,
    /// Exclude completed tasks.
    pub hide_completed: bool,
}

impl TaskFilter {
    /// Combine the current search text with the current preferences.
    #[must_use]
    pub fn new(search: impl Into<String>, preferences: FilterPreferences) -> Self {
        Self {
            search: search.into(),
            sort_order: preferences.sort_order,
            hide_completed: preferences.hide_completed,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
