//! Task-list view-model: live query pipeline plus user intents.
//!
//! [`TaskListModel`] combines two continuously-changing inputs, the search
//! text and the injected preferences, into one live store subscription.
//! Whenever either input changes, the pipeline drops the current
//! subscription and opens a new one for the latest (search, preferences)
//! pair, so only results for that pair ever reach the output channel and a
//! stale query can never overwrite a fresher one.
//!
//! User intents are synchronous entry points that dispatch their store or
//! preference write as an independent task, optionally followed by one
//! event-channel send. Store failures on these paths are logged and
//! swallowed; the presentation layer never sees them.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use taskpad_core::events::{ADD_TASK_RESULT_OK, EDIT_TASK_RESULT_OK, TaskListEvent};
use taskpad_core::task::{FilterPreferences, SortOrder, Task, TaskFilter};
use taskpad_settings::PreferencesManager;
use taskpad_store::TaskStore;

use crate::event_channel::EventChannel;

/// View-model for the task-list screen.
///
/// Owns the search state, the query pipeline task, and the one-shot event
/// channel toward the presentation layer. The pipeline task is aborted on
/// drop.
pub struct TaskListModel {
    store: Arc<TaskStore>,
    preferences: Arc<PreferencesManager>,
    search_tx: watch::Sender<String>,
    tasks_rx: watch::Receiver<Vec<Task>>,
    events: Arc<EventChannel<TaskListEvent>>,
    pipeline: JoinHandle<()>,
}

impl TaskListModel {
    /// Create a model with an empty search box.
    ///
    /// Must be called inside a Tokio runtime; the query pipeline is
    /// spawned immediately and emits the current list without waiting for
    /// an input change.
    #[must_use]
    pub fn new(store: Arc<TaskStore>, preferences: Arc<PreferencesManager>) -> Self {
        Self::with_search_query(store, preferences, "")
    }

    /// Create a model with a restored search query.
    ///
    /// Pairs with [`TaskListModel::search_query`] so a recreated screen
    /// sees the same filtered list as before.
    #[must_use]
    pub fn with_search_query(
        store: Arc<TaskStore>,
        preferences: Arc<PreferencesManager>,
        search_query: impl Into<String>,
    ) -> Self {
        let (search_tx, search_rx) = watch::channel(search_query.into());
        let (tasks_tx, tasks_rx) = watch::channel(Vec::new());
        let pipeline = tokio::spawn(list_pipeline(
            store.clone(),
            search_rx,
            preferences.subscribe(),
            tasks_tx,
        ));
        Self {
            store,
            preferences,
            search_tx,
            tasks_rx,
            events: Arc::new(EventChannel::new()),
            pipeline,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Derived state
    // ─────────────────────────────────────────────────────────────────────

    /// Subscribe to the visible task list.
    ///
    /// The receiver always holds the most recent result; re-subscribing
    /// observes current state immediately via `borrow`.
    #[must_use]
    pub fn tasks(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks_rx.clone()
    }

    /// The current search text, for state saving.
    #[must_use]
    pub fn search_query(&self) -> String {
        self.search_tx.borrow().clone()
    }

    /// Replace the search text. Setting the same text again is a no-op
    /// and does not restart the query.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        let _ = self.search_tx.send_if_modified(|current| {
            if *current == query {
                false
            } else {
                *current = query;
                true
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Intents
    // ─────────────────────────────────────────────────────────────────────

    /// The user picked a sort order from the menu.
    pub fn sort_order_selected(&self, sort_order: SortOrder) {
        let preferences = self.preferences.clone();
        let _ = tokio::spawn(async move {
            if let Err(err) = preferences.update_sort_order(sort_order) {
                warn!(error = %err, "failed to persist sort order");
            }
        });
    }

    /// The user toggled the hide-completed menu item.
    pub fn hide_completed_changed(&self, hide_completed: bool) {
        let preferences = self.preferences.clone();
        let _ = tokio::spawn(async move {
            if let Err(err) = preferences.update_hide_completed(hide_completed) {
                warn!(error = %err, "failed to persist hide-completed flag");
            }
        });
    }

    /// The user tapped a task row.
    pub fn task_selected(&self, task: &Task) {
        self.send_event(TaskListEvent::NavigateToEditScreen { task: task.clone() });
    }

    /// The user toggled a task's checkbox.
    pub fn task_check_changed(&self, task: &Task, completed: bool) {
        let store = self.store.clone();
        let updated = Task {
            completed,
            ..task.clone()
        };
        let _ = tokio::spawn(async move {
            if let Err(err) = store.update(&updated) {
                warn!(id = updated.id, error = %err, "failed to update task completion");
            }
        });
    }

    /// The user swiped a task away: delete it, then offer undo exactly
    /// once.
    pub fn task_swiped(&self, task: &Task) {
        let store = self.store.clone();
        let events = self.events.clone();
        let task = task.clone();
        let _ = tokio::spawn(async move {
            match store.delete(&task) {
                Ok(_) => {
                    events
                        .send(TaskListEvent::ShowUndoDeleteMessage { task })
                        .await;
                }
                Err(err) => warn!(id = task.id, error = %err, "failed to delete swiped task"),
            }
        });
    }

    /// The user tapped undo on the delete snackbar: restore the task
    /// under its original id. No further event is emitted.
    pub fn undo_delete_clicked(&self, task: Task) {
        let store = self.store.clone();
        let _ = tokio::spawn(async move {
            if let Err(err) = store.insert(&task) {
                warn!(id = task.id, error = %err, "failed to restore deleted task");
            }
        });
    }

    /// The user tapped the add button.
    pub fn add_task_clicked(&self) {
        self.send_event(TaskListEvent::NavigateToAddScreen);
    }

    /// The editor screen reported back its result code.
    pub fn editor_result(&self, result_code: i32) {
        match result_code {
            ADD_TASK_RESULT_OK => self.show_saved_message("已添加"),
            EDIT_TASK_RESULT_OK => self.show_saved_message("已更新事项"),
            _ => {}
        }
    }

    /// The user confirmed the delete-all-completed dialog.
    pub fn delete_all_completed_confirmed(&self) {
        let store = self.store.clone();
        let _ = tokio::spawn(async move {
            if let Err(err) = store.delete_completed_tasks() {
                warn!(error = %err, "failed to delete completed tasks");
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// Wait for the next one-shot UI event.
    pub async fn next_event(&self) -> Option<TaskListEvent> {
        self.events.recv().await
    }

    /// Take the next UI event if one is already queued.
    #[must_use]
    pub fn try_next_event(&self) -> Option<TaskListEvent> {
        self.events.try_recv()
    }

    fn show_saved_message(&self, text: &str) {
        self.send_event(TaskListEvent::ShowSavedMessage {
            text: text.to_string(),
        });
    }

    fn send_event(&self, event: TaskListEvent) {
        let events = self.events.clone();
        let _ = tokio::spawn(async move { events.send(event).await });
    }
}

impl Drop for TaskListModel {
    fn drop(&mut self) {
        self.pipeline.abort();
    }
}

/// The query pipeline: combine-latest over (search, preferences), then
/// switch-to-latest over store subscriptions.
///
/// Each loop iteration reads the latest pair, opens one store subscription
/// for it, and forwards emissions until either input changes; the change
/// drops the subscription and starts over with the new pair. Emissions can
/// therefore only come from the subscription matching the latest observed
/// pair.
async fn list_pipeline(
    store: Arc<TaskStore>,
    mut search_rx: watch::Receiver<String>,
    mut prefs_rx: watch::Receiver<FilterPreferences>,
    tasks_tx: watch::Sender<Vec<Task>>,
) {
    loop {
        let search = search_rx.borrow_and_update().clone();
        let preferences = *prefs_rx.borrow_and_update();
        let mut subscription = store.watch(TaskFilter::new(search, preferences));

        loop {
            tokio::select! {
                rows = subscription.next() => {
                    match rows {
                        Some(Ok(rows)) => {
                            if tasks_tx.send(rows).is_err() {
                                // All list consumers are gone
                                return;
                            }
                        }
                        Some(Err(err)) => {
                            warn!(error = %err, "task query failed");
                        }
                        // Store dropped
                        None => return,
                    }
                }
                changed = search_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
                changed = prefs_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Fixture {
        model: TaskListModel,
        store: Arc<TaskStore>,
        preferences: Arc<PreferencesManager>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TaskStore::open_in_memory().unwrap());
        let preferences = Arc::new(PreferencesManager::load(
            dir.path().join("preferences.json"),
        ));
        let model = TaskListModel::new(store.clone(), preferences.clone());
        Fixture {
            model,
            store,
            preferences,
            _dir: dir,
        }
    }

    fn seed_scenario(store: &TaskStore) {
        // (买水果, not important) inserted before (去颐和园, important)
        store.insert(&Task::new("买水果", false)).unwrap();
        store.insert(&Task::new("去颐和园", true)).unwrap();
    }

    fn names(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.name.clone()).collect()
    }

    async fn wait_until<F>(rx: &mut watch::Receiver<Vec<Task>>, mut predicate: F) -> Vec<Task>
    where
        F: FnMut(&[Task]) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                {
                    let current = rx.borrow_and_update();
                    if predicate(&current) {
                        return current.clone();
                    }
                }
                rx.changed().await.expect("task list channel closed");
            }
        })
        .await
        .expect("timed out waiting for task list state")
    }

    async fn wait_for_names(rx: &mut watch::Receiver<Vec<Task>>, expected: &[&str]) -> Vec<Task> {
        wait_until(rx, |tasks| names(tasks) == expected).await
    }

    async fn next_event_soon(model: &TaskListModel) -> TaskListEvent {
        tokio::time::timeout(Duration::from_secs(5), model.next_event())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    // --- Query composition ---

    #[tokio::test]
    async fn by_date_puts_important_first() {
        let f = fixture();
        seed_scenario(&f.store);

        let mut rx = f.model.tasks();
        wait_for_names(&mut rx, &["去颐和园", "买水果"]).await;
    }

    #[tokio::test]
    async fn by_name_orders_by_code_point() {
        let f = fixture();
        seed_scenario(&f.store);

        f.model.sort_order_selected(SortOrder::ByName);

        let mut rx = f.model.tasks();
        wait_for_names(&mut rx, &["买水果", "去颐和园"]).await;
    }

    #[tokio::test]
    async fn search_narrows_and_clearing_restores() {
        let f = fixture();
        seed_scenario(&f.store);

        let mut rx = f.model.tasks();
        wait_until(&mut rx, |tasks| tasks.len() == 2).await;

        f.model.set_search_query("水果");
        wait_for_names(&mut rx, &["买水果"]).await;

        f.model.set_search_query("");
        wait_until(&mut rx, |tasks| tasks.len() == 2).await;
    }

    #[tokio::test]
    async fn changing_sort_preserves_search() {
        let f = fixture();
        seed_scenario(&f.store);
        f.store.insert(&Task::new("去快递", false)).unwrap();

        f.model.set_search_query("去");
        let mut rx = f.model.tasks();
        wait_until(&mut rx, |tasks| {
            tasks.len() == 2 && tasks.iter().all(|t| t.name.contains('去'))
        })
        .await;

        f.model.sort_order_selected(SortOrder::ByName);
        wait_for_names(&mut rx, &["去快递", "去颐和园"]).await;
        assert_eq!(f.model.search_query(), "去");
    }

    #[tokio::test]
    async fn hide_completed_excludes_and_reincludes() {
        let f = fixture();
        f.store.insert(&Task::new("唱歌", false)).unwrap();
        f.store
            .insert(&Task {
                completed: true,
                ..Task::new("冥想", false)
            })
            .unwrap();

        let mut rx = f.model.tasks();
        wait_until(&mut rx, |tasks| tasks.len() == 2).await;

        f.model.hide_completed_changed(true);
        wait_for_names(&mut rx, &["唱歌"]).await;

        f.model.hide_completed_changed(false);
        wait_until(&mut rx, |tasks| tasks.len() == 2).await;
    }

    #[tokio::test]
    async fn restored_search_query_applies_from_the_start() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TaskStore::open_in_memory().unwrap());
        store.insert(&Task::new("to the moon", false)).unwrap();
        store.insert(&Task::new("买水果", false)).unwrap();
        let preferences = Arc::new(PreferencesManager::load(
            dir.path().join("preferences.json"),
        ));

        let model = TaskListModel::with_search_query(store, preferences, "moon");
        assert_eq!(model.search_query(), "moon");

        let mut rx = model.tasks();
        wait_for_names(&mut rx, &["to the moon"]).await;
    }

    #[tokio::test]
    async fn rapid_search_changes_converge_on_last_value() {
        let f = fixture();
        f.store.insert(&Task::new("fly to berlin", false)).unwrap();
        f.store.insert(&Task::new("fly home", false)).unwrap();

        let mut rx = f.model.tasks();
        wait_until(&mut rx, |tasks| tasks.len() == 2).await;

        // Keystroke burst; only the final query may win
        f.model.set_search_query("f");
        f.model.set_search_query("fly");
        f.model.set_search_query("fly to");
        wait_for_names(&mut rx, &["fly to berlin"]).await;
        assert_eq!(f.model.search_query(), "fly to");

        // Converged: no later emission may revert to an older pair
        let extra = tokio::time::timeout(Duration::from_millis(100), rx.changed()).await;
        assert!(extra.is_err(), "unexpected emission after convergence");
    }

    #[tokio::test]
    async fn sort_selection_is_persisted() {
        let f = fixture();
        seed_scenario(&f.store);

        f.model.sort_order_selected(SortOrder::ByName);
        let mut rx = f.model.tasks();
        wait_for_names(&mut rx, &["买水果", "去颐和园"]).await;

        assert_eq!(f.preferences.current().sort_order, SortOrder::ByName);
    }

    // --- Store intents ---

    #[tokio::test]
    async fn check_change_updates_the_store() {
        let f = fixture();
        f.store.insert(&Task::new("洗澡", false)).unwrap();

        let mut rx = f.model.tasks();
        let tasks = wait_until(&mut rx, |tasks| tasks.len() == 1).await;

        f.model.task_check_changed(&tasks[0], true);
        wait_until(&mut rx, |tasks| tasks.len() == 1 && tasks[0].completed).await;
    }

    #[tokio::test]
    async fn swipe_deletes_and_offers_undo_once() {
        let f = fixture();
        f.store.insert(&Task::new("去快递", false)).unwrap();

        let mut rx = f.model.tasks();
        let tasks = wait_until(&mut rx, |tasks| tasks.len() == 1).await;
        let task = tasks[0].clone();

        f.model.task_swiped(&task);
        wait_until(&mut rx, |tasks| tasks.is_empty()).await;

        let event = next_event_soon(&f.model).await;
        assert_eq!(
            event,
            TaskListEvent::ShowUndoDeleteMessage { task: task.clone() }
        );

        // Undo restores the task under its original id, with no event
        f.model.undo_delete_clicked(task.clone());
        let restored = wait_until(&mut rx, |tasks| tasks.len() == 1).await;
        assert_eq!(restored[0], task);
        assert_eq!(f.model.try_next_event(), None);
    }

    #[tokio::test]
    async fn delete_all_completed_removes_only_completed() {
        let f = fixture();
        f.store.insert(&Task::new("唱歌", false)).unwrap();
        f.store
            .insert(&Task {
                completed: true,
                ..Task::new("冥想", false)
            })
            .unwrap();

        let mut rx = f.model.tasks();
        wait_until(&mut rx, |tasks| tasks.len() == 2).await;

        f.model.delete_all_completed_confirmed();
        wait_for_names(&mut rx, &["唱歌"]).await;
    }

    // --- Event intents ---

    #[tokio::test]
    async fn selection_and_add_emit_navigation_events_in_order() {
        let f = fixture();
        let task = Task {
            id: 5,
            ..Task::new("买水果", false)
        };

        f.model.task_selected(&task);
        let event = next_event_soon(&f.model).await;
        assert_eq!(event, TaskListEvent::NavigateToEditScreen { task });

        f.model.add_task_clicked();
        let event = next_event_soon(&f.model).await;
        assert_eq!(event, TaskListEvent::NavigateToAddScreen);
    }

    #[tokio::test]
    async fn editor_results_map_to_saved_messages() {
        let f = fixture();

        f.model.editor_result(ADD_TASK_RESULT_OK);
        assert_eq!(
            next_event_soon(&f.model).await,
            TaskListEvent::ShowSavedMessage {
                text: "已添加".to_string()
            }
        );

        f.model.editor_result(EDIT_TASK_RESULT_OK);
        assert_eq!(
            next_event_soon(&f.model).await,
            TaskListEvent::ShowSavedMessage {
                text: "已更新事项".to_string()
            }
        );

        // Unknown result codes are ignored
        f.model.editor_result(99);
        assert_eq!(f.model.try_next_event(), None);
    }

    // --- Lifecycle ---

    #[tokio::test]
    async fn dropping_the_model_ends_the_list_channel() {
        let f = fixture();
        let mut rx = f.model.tasks();
        wait_until(&mut rx, |tasks| tasks.is_empty()).await;

        drop(f.model);
        let closed = tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("timed out waiting for channel close");
        assert!(closed.is_err());
    }
}
