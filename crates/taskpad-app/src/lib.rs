//! # taskpad-app
//!
//! View-model layer for the Taskpad to-do core.
//!
//! Responsibilities:
//!
//! - **[`TaskListModel`]**: the live task list derived from search text and
//!   preferences, plus the list screen's intents (select, check, swipe,
//!   undo, sort, hide-completed, delete-all-completed)
//! - **[`EditorModel`]**: add/edit draft state, validation, and save
//! - **[`EventChannel`]**: one-shot at-most-once event delivery from the
//!   view-models to a presentation layer that may attach and detach
//!
//! ## Crate Position
//!
//! Top of the workspace. Consumes `taskpad-store` and `taskpad-settings`;
//! exposes the API a native presentation shell drives.

#![deny(unsafe_code)]

pub mod editor;
pub mod event_channel;
pub mod task_list;

pub use editor::EditorModel;
pub use event_channel::EventChannel;
pub use task_list::TaskListModel;
