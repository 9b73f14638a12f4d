//! Add/edit view-model: draft state, validation, save.
//!
//! [`EditorModel`] holds the mutable draft (name and importance) for one
//! editor screen. In edit mode the draft starts from the task under edit;
//! in add mode it starts empty. Saving validates the name, then writes the
//! store and navigates back with a result code the task-list screen maps
//! to a confirmation message. A blank name aborts the save with an
//! invalid-input event and persists nothing.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use taskpad_core::events::{ADD_TASK_RESULT_OK, EDIT_TASK_RESULT_OK, EditorEvent};
use taskpad_core::task::Task;
use taskpad_store::TaskStore;

use crate::event_channel::EventChannel;

/// Mutable editor draft.
#[derive(Clone)]
struct TaskDraft {
    name: String,
    important: bool,
}

/// View-model for the add/edit screen.
pub struct EditorModel {
    store: Arc<TaskStore>,
    task: Option<Task>,
    draft: Mutex<TaskDraft>,
    events: Arc<EventChannel<EditorEvent>>,
}

impl EditorModel {
    /// Create an editor. `task = None` is the add flow; `Some` edits that
    /// task, seeding the draft from its current values.
    #[must_use]
    pub fn new(store: Arc<TaskStore>, task: Option<Task>) -> Self {
        let draft = TaskDraft {
            name: task.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            important: task.as_ref().is_some_and(|t| t.important),
        };
        Self {
            store,
            task,
            draft: Mutex::new(draft),
            events: Arc::new(EventChannel::new()),
        }
    }

    /// Create an editor with a restored draft (state restore), overriding
    /// the values the task itself would seed.
    #[must_use]
    pub fn with_draft(
        store: Arc<TaskStore>,
        task: Option<Task>,
        name: impl Into<String>,
        important: bool,
    ) -> Self {
        Self {
            store,
            task,
            draft: Mutex::new(TaskDraft {
                name: name.into(),
                important,
            }),
            events: Arc::new(EventChannel::new()),
        }
    }

    /// The task under edit, if any.
    #[must_use]
    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    /// Current draft name.
    #[must_use]
    pub fn name(&self) -> String {
        self.draft.lock().name.clone()
    }

    /// Replace the draft name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.draft.lock().name = name.into();
    }

    /// Current draft importance flag.
    #[must_use]
    pub fn important(&self) -> bool {
        self.draft.lock().important
    }

    /// Replace the draft importance flag.
    pub fn set_important(&self, important: bool) {
        self.draft.lock().important = important;
    }

    /// The user tapped save.
    ///
    /// A blank name (after trimming) emits `ShowInvalidInputMessage` and
    /// persists nothing. Otherwise the draft is written and the editor
    /// navigates back with the matching result code. The saved name keeps
    /// its surrounding whitespace; trimming is only the blank check.
    pub fn save_clicked(&self) {
        let draft = self.draft.lock().clone();
        if draft.name.trim().is_empty() {
            self.send_event(EditorEvent::ShowInvalidInputMessage {
                text: "事项名称不能为空".to_string(),
            });
            return;
        }

        let (task, code) = match &self.task {
            // Edit keeps id, completion state, and creation time
            Some(original) => (
                Task {
                    name: draft.name,
                    important: draft.important,
                    ..original.clone()
                },
                EDIT_TASK_RESULT_OK,
            ),
            None => (Task::new(draft.name, draft.important), ADD_TASK_RESULT_OK),
        };

        let store = self.store.clone();
        let events = self.events.clone();
        let _ = tokio::spawn(async move {
            match store.insert(&task) {
                Ok(_) => {
                    events
                        .send(EditorEvent::NavigateBackWithResult { code })
                        .await;
                }
                Err(err) => warn!(error = %err, "failed to save task"),
            }
        });
    }

    /// Wait for the next one-shot UI event.
    pub async fn next_event(&self) -> Option<EditorEvent> {
        self.events.recv().await
    }

    /// Take the next UI event if one is already queued.
    #[must_use]
    pub fn try_next_event(&self) -> Option<EditorEvent> {
        self.events.try_recv()
    }

    fn send_event(&self, event: EditorEvent) {
        let events = self.events.clone();
        let _ = tokio::spawn(async move { events.send(event).await });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
