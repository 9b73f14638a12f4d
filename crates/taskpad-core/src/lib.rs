//! # taskpad-core
//!
//! Foundation types for the Taskpad to-do core.
//!
//! This crate provides the shared vocabulary that the other Taskpad crates
//! depend on:
//!
//! - **Tasks**: [`task::Task`] plus the [`task::SortOrder`],
//!   [`task::FilterPreferences`], and [`task::TaskFilter`] query vocabulary
//! - **Events**: [`events::TaskListEvent`] and [`events::EditorEvent`] tagged
//!   unions delivered to the presentation shell, and the editor result codes
//! - **Logging**: [`logging::init_subscriber`] for binaries and tests
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `taskpad-store`, `taskpad-settings`,
//! and `taskpad-app`.

#![deny(unsafe_code)]

pub mod events;
pub mod logging;
pub mod task;

pub use events::{ADD_TASK_RESULT_OK, EDIT_TASK_RESULT_OK, EditorEvent, TaskListEvent};
pub use task::{FilterPreferences, SortOrder, Task, TaskFilter};
