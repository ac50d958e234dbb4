use std::sync::{Arc, Mutex, MutexGuard};

use crate::gesture::{ArmedPress, PressGesture, PressOrigin};
use crate::menu::ContextMenu;
use crate::models::{now_millis, Task};
use crate::storage::{FileStore, KeyValueStore, KvError};
use crate::store::{Commit, EditOutcome, TaskStore};

/// State handle managed by the desktop shell.
pub type SharedState = AppState<FileStore>;

/// The one unit of application state: the task store, the press-gesture
/// classifier, and the context menu, mutated in place behind a single lock
/// for the process lifetime.
pub struct AppState<S: KeyValueStore> {
    inner: Arc<Mutex<AppData<S>>>,
}

struct AppData<S: KeyValueStore> {
    store: TaskStore<S>,
    gesture: PressGesture,
    menu: ContextMenu,
    unavailable_noticed: bool,
}

impl<S: KeyValueStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData {
                store,
                gesture: PressGesture::new(),
                menu: ContextMenu::new(),
                unavailable_noticed: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppData<S>> {
        self.inner.lock().expect("state poisoned")
    }

    pub fn load(&self) {
        self.lock().store.load();
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().store.tasks().to_vec()
    }

    pub fn dark_mode(&self) -> bool {
        self.lock().store.dark_mode()
    }

    pub fn add_task(&self, raw_text: &str) -> Option<Commit<Task>> {
        self.lock().store.add(raw_text)
    }

    pub fn toggle_task(&self, task_id: &str) -> Option<Commit<Task>> {
        self.lock().store.toggle_completion(task_id)
    }

    pub fn edit_task(&self, task_id: &str, raw_text: &str) -> Option<Commit<EditOutcome>> {
        self.lock().store.edit(task_id, raw_text)
    }

    pub fn delete_task(&self, task_id: &str) -> Option<Commit<()>> {
        self.lock().store.delete(task_id)
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        self.lock().store.set_dark_mode(enabled);
    }

    pub fn press_start(&self, task_id: &str, origin: PressOrigin) -> Option<ArmedPress> {
        self.lock().gesture.press_start(task_id, origin, now_millis())
    }

    pub fn press_move(&self) {
        self.lock().gesture.press_move();
    }

    pub fn press_end(&self) {
        self.lock().gesture.press_end();
    }

    pub fn press_leave(&self) {
        self.lock().gesture.pointer_leave();
    }

    /// Resolves an elapsed press timer. When the press is still live and the
    /// item still exists, the menu opens on it and its id is returned; stale
    /// generations and since-deleted items fire nothing.
    pub fn long_press_elapsed(&self, generation: u64) -> Option<String> {
        let mut data = self.lock();
        let task_id = data.gesture.timer_elapsed(generation)?;
        if data.store.find(&task_id).is_none() {
            return None;
        }
        data.menu.open(&task_id);
        Some(task_id)
    }

    /// Direct menu invocation; only items that exist can host a menu.
    pub fn open_menu(&self, task_id: &str) -> bool {
        let mut data = self.lock();
        if data.store.find(task_id).is_none() {
            return false;
        }
        data.menu.open(task_id);
        true
    }

    pub fn close_menu(&self) {
        self.lock().menu.close();
    }

    pub fn menu_active(&self) -> Option<String> {
        self.lock().menu.active().map(str::to_string)
    }

    pub fn request_delete(&self) -> Option<String> {
        self.lock().menu.request_delete().map(str::to_string)
    }

    /// Completes the two-step delete: resolves the armed confirmation and
    /// removes the record. The id may have vanished in between; that ends the
    /// interaction quietly.
    pub fn confirm_delete(&self) -> Option<Commit<()>> {
        let mut data = self.lock();
        let task_id = data.menu.confirm_delete()?;
        data.store.delete(&task_id)
    }

    pub fn cancel_delete(&self) {
        self.lock().menu.cancel_delete();
    }

    /// Latches the storage-unavailable notice: true only on the first failed
    /// write, so the user is told once and later failures stay log-only.
    pub fn should_notice_unavailable(&self) -> bool {
        let mut data = self.lock();
        if data.unavailable_noticed {
            return false;
        }
        data.unavailable_noticed = true;
        true
    }

    /// A quota notice is actionable every time it happens.
    pub fn should_notice(&self, error: &KvError) -> bool {
        match error {
            KvError::QuotaExceeded => true,
            KvError::Unavailable(_) => self.should_notice_unavailable(),
        }
    }
}
