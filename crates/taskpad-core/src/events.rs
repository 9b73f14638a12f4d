//! One-shot UI-intent events.
//!
//! Two event families, one per view-model:
//!
//! - **[`TaskListEvent`]**: emitted by the task-list view-model (navigate to
//!   the editor, offer undo after a swipe-delete, confirm a save).
//! - **[`EditorEvent`]**: emitted by the add/edit view-model (reject invalid
//!   input, navigate back carrying a result code).
//!
//! Both are closed sets: consumers match exhaustively, so adding a variant
//! is a compile-visible change everywhere it matters. Events are delivered
//! at most once through an event channel; they are never persisted.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Result code delivered back to the task list after a successful add.
pub const ADD_TASK_RESULT_OK: i32 = 1;

/// Result code delivered back to the task list after a successful edit.
pub const EDIT_TASK_RESULT_OK: i32 = 2;

/// Events emitted by the task-list view-model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskListEvent {
    /// Open the editor with no task (add flow).
    #[serde(rename = "navigate_to_add_screen")]
    NavigateToAddScreen,

    /// Open the editor for an existing task.
    #[serde(rename = "navigate_to_edit_screen")]
    NavigateToEditScreen {
        /// Task to edit.
        task: Task,
    },

    /// A task was swipe-deleted; offer to undo.
    #[serde(rename = "show_undo_delete_message")]
    ShowUndoDeleteMessage {
        /// The deleted task, re-insertable as-is.
        task: Task,
    },

    /// Confirm a completed save with a transient message.
    #[serde(rename = "show_saved_message")]
    ShowSavedMessage {
        /// Message text, e.g. "已添加".
        text: String,
    },
}

impl TaskListEvent {
    /// The wire discriminator for this event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NavigateToAddScreen => "navigate_to_add_screen",
            Self::NavigateToEditScreen { .. } => "navigate_to_edit_screen",
            Self::ShowUndoDeleteMessage { .. } => "show_undo_delete_message",
            Self::ShowSavedMessage { .. } => "show_saved_message",
        }
    }
}

/// Events emitted by the add/edit view-model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EditorEvent {
    /// The draft failed validation; nothing was persisted.
    #[serde(rename = "show_invalid_input_message")]
    ShowInvalidInputMessage {
        /// Why the input was rejected.
        text: String,
    },

    /// The save succeeded; leave the editor.
    #[serde(rename = "navigate_back_with_result")]
    NavigateBackWithResult {
        /// [`ADD_TASK_RESULT_OK`] or [`EDIT_TASK_RESULT_OK`].
        code: i32,
    },
}

impl EditorEvent {
    /// The wire discriminator for this event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ShowInvalidInputMessage { .. } => "show_invalid_input_message",
            Self::NavigateBackWithResult { .. } => "navigate_back_with_result",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
