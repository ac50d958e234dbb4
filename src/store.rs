use serde::Serialize;

use crate::models::{now_millis, Task};
use crate::storage::{KeyValueStore, KvError};

/// Fixed persistence keys, kept identical to the browser app's layout so an
/// exported localStorage dump loads unchanged.
pub const TASKS_KEY: &str = "todoapp_tasks";
pub const DARK_MODE_KEY: &str = "todoapp_darkmode";

/// A mutation that was applied in memory, plus the outcome of the
/// write-through. A failed write never rolls the mutation back; memory stays
/// the source of truth for the rest of the session.
#[derive(Debug)]
pub struct Commit<T> {
    pub value: T,
    pub persist: Result<(), KvError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditOutcome {
    Updated(Task),
    /// The edit trimmed to empty text, which deletes the record.
    Removed,
}

/// The ordered task collection and theme flag, with write-through persistence
/// over an injected key-value store.
pub struct TaskStore<S: KeyValueStore> {
    kv: S,
    tasks: Vec<Task>,
    dark_mode: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            tasks: Vec::new(),
            dark_mode: false,
        }
    }

    /// Populates the collection and theme flag from the store.
    ///
    /// Task data that fails to parse is discarded and its key removed; a
    /// corrupt store must never brick the app, only reset it. Dark mode is
    /// enabled iff the stored value is the literal string "true".
    pub fn load(&mut self) {
        self.tasks = match self.kv.get(TASKS_KEY) {
            Some(json) => match serde_json::from_str::<Vec<Task>>(&json) {
                Ok(tasks) => tasks,
                Err(err) => {
                    log::warn!("discarding corrupt task data: {err}");
                    self.kv.remove(TASKS_KEY);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        self.dark_mode = self.kv.get(DARK_MODE_KEY).as_deref() == Some("true");
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a new record built from `raw_text`. Input that trims to empty
    /// creates nothing and writes nothing.
    pub fn add(&mut self, raw_text: &str) -> Option<Commit<Task>> {
        let task = Task::create(raw_text)?;
        self.tasks.push(task.clone());
        let persist = self.persist();
        Some(Commit {
            value: task,
            persist,
        })
    }

    /// Flips the completed flag of the matching record. Unknown ids are a
    /// silent no-op; the record may have been deleted under an open menu.
    pub fn toggle_completion(&mut self, id: &str) -> Option<Commit<Task>> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        task.updated_at = now_millis();
        let updated = task.clone();
        let persist = self.persist();
        Some(Commit {
            value: updated,
            persist,
        })
    }

    /// Replaces the text of the matching record with the trimmed input.
    /// Editing to empty text deletes the record instead. Edited text is not
    /// re-capped; only creation applies the length cap.
    pub fn edit(&mut self, id: &str, raw_text: &str) -> Option<Commit<EditOutcome>> {
        if self.find(id).is_none() {
            return None;
        }
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            let removed = self.delete(id)?;
            return Some(Commit {
                value: EditOutcome::Removed,
                persist: removed.persist,
            });
        }
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.text = trimmed.to_string();
        task.updated_at = now_millis();
        let updated = task.clone();
        let persist = self.persist();
        Some(Commit {
            value: EditOutcome::Updated(updated),
            persist,
        })
    }

    /// Removes the matching record. Absent ids are a silent no-op and write
    /// nothing.
    pub fn delete(&mut self, id: &str) -> Option<Commit<()>> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return None;
        }
        let persist = self.persist();
        Some(Commit {
            value: (),
            persist,
        })
    }

    /// Flips the theme flag and saves it best-effort. The preference is not
    /// worth a user-facing notice when the write fails.
    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.dark_mode = enabled;
        let value = if enabled { "true" } else { "false" };
        if let Err(err) = self.kv.set(DARK_MODE_KEY, value) {
            log::warn!("failed to save theme preference: {err}");
        }
    }

    /// Serializes the full collection under the tasks key.
    pub fn persist(&mut self) -> Result<(), KvError> {
        let json = serde_json::to_string(&self.tasks)
            .map_err(|err| KvError::Unavailable(format!("serialize tasks: {err}")))?;
        self.kv.set(TASKS_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn empty_store() -> TaskStore<MemoryStore> {
        TaskStore::new(MemoryStore::new())
    }

    #[test]
    fn add_appends_exactly_one_record_with_trimmed_text() {
        let mut store = empty_store();
        let commit = store.add("  walk the dog  ").expect("record created");
        assert!(commit.persist.is_ok());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].text, "walk the dog");
        assert_eq!(store.tasks()[0].id, commit.value.id);
    }

    #[test]
    fn add_rejects_whitespace_only_input_without_writing() {
        let mut store = empty_store();
        assert!(store.add("   \n\t ").is_none());
        assert!(store.tasks().is_empty());
        assert_eq!(store.kv.get(TASKS_KEY), None);
    }

    #[test]
    fn add_truncates_long_input_to_the_cap() {
        let mut store = empty_store();
        let input = "a".repeat(1200);
        let commit = store.add(&input).expect("record created");
        assert_eq!(commit.value.text.chars().count(), 1000);
        assert_eq!(commit.value.text, input[..1000]);
    }

    #[test]
    fn new_tasks_append_in_insertion_order() {
        let mut store = empty_store();
        store.add("first").unwrap();
        store.add("second").unwrap();
        store.add("third").unwrap();
        let texts: Vec<&str> = store.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn load_after_persist_reproduces_an_equal_collection() {
        let mut store = empty_store();
        store.add("one").unwrap();
        let toggled = store.add("two").unwrap().value;
        store.toggle_completion(&toggled.id).unwrap();

        let snapshot = store.tasks().to_vec();
        store.load();
        assert_eq!(store.tasks(), snapshot.as_slice());
    }

    #[test]
    fn toggle_twice_restores_flag_and_never_rewinds_updated_at() {
        let mut store = empty_store();
        let task = store.add("flip me").unwrap().value;

        let first = store.toggle_completion(&task.id).unwrap().value;
        assert!(first.completed);
        let second = store.toggle_completion(&task.id).unwrap().value;
        assert!(!second.completed);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn toggle_of_unknown_id_is_a_no_op() {
        let mut store = empty_store();
        store.add("keep").unwrap();
        assert!(store.toggle_completion("missing").is_none());
        assert!(!store.tasks()[0].completed);
    }

    #[test]
    fn edit_replaces_text_and_refreshes_updated_at() {
        let mut store = empty_store();
        let task = store.add("draft").unwrap().value;
        let commit = store.edit(&task.id, "  final  ").unwrap();
        match commit.value {
            EditOutcome::Updated(updated) => {
                assert_eq!(updated.text, "final");
                assert!(updated.updated_at >= task.updated_at);
                assert_eq!(updated.created_at, task.created_at);
            }
            EditOutcome::Removed => panic!("edit should not remove"),
        }
    }

    #[test]
    fn edit_to_empty_deletes_the_record() {
        let mut store = empty_store();
        let task = store.add("doomed").unwrap().value;
        let commit = store.edit(&task.id, "   ").unwrap();
        assert_eq!(commit.value, EditOutcome::Removed);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn edit_does_not_reapply_the_creation_cap() {
        let mut store = empty_store();
        let task = store.add("short").unwrap().value;
        let long = "b".repeat(1500);
        let commit = store.edit(&task.id, &long).unwrap();
        match commit.value {
            EditOutcome::Updated(updated) => assert_eq!(updated.text.chars().count(), 1500),
            EditOutcome::Removed => panic!("edit should not remove"),
        }
    }

    #[test]
    fn delete_removes_only_the_matching_record() {
        let mut store = empty_store();
        let a = store.add("a").unwrap().value;
        let b = store.add("b").unwrap().value;
        store.delete(&a.id).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].id, b.id);
        assert!(store.delete(&a.id).is_none());
    }

    #[test]
    fn load_discards_corrupt_task_data_and_clears_the_key() {
        let mut kv = MemoryStore::new();
        kv.set(TASKS_KEY, "not json").unwrap();
        let mut store = TaskStore::new(kv);
        store.load();
        assert!(store.tasks().is_empty());
        assert_eq!(store.kv.get(TASKS_KEY), None);
    }

    #[test]
    fn load_parses_theme_flag_strictly() {
        for (stored, expected) in [
            (Some("true"), true),
            (Some("false"), false),
            (Some("TRUE"), false),
            (Some("1"), false),
            (None, false),
        ] {
            let mut kv = MemoryStore::new();
            if let Some(value) = stored {
                kv.set(DARK_MODE_KEY, value).unwrap();
            }
            let mut store = TaskStore::new(kv);
            store.load();
            assert_eq!(store.dark_mode(), expected, "stored value {stored:?}");
        }
    }

    #[test]
    fn set_dark_mode_round_trips_through_the_store() {
        let mut store = empty_store();
        store.set_dark_mode(true);
        assert_eq!(store.kv.get(DARK_MODE_KEY).as_deref(), Some("true"));
        store.load();
        assert!(store.dark_mode());

        store.set_dark_mode(false);
        store.load();
        assert!(!store.dark_mode());
    }

    #[test]
    fn quota_failure_keeps_the_in_memory_mutation() {
        // Budget fits the first record but not the second.
        let mut store = TaskStore::new(MemoryStore::with_capacity(256));
        let first = store.add("small").expect("record created");
        assert!(first.persist.is_ok());

        let commit = store.add(&"y".repeat(200)).expect("mutation still applies");
        assert_eq!(commit.persist, Err(KvError::QuotaExceeded));
        // Memory keeps both records even though the write was rejected.
        assert_eq!(store.tasks().len(), 2);
    }

    #[test]
    fn unavailable_store_reports_distinct_error_and_stays_usable() {
        let mut store = TaskStore::new(MemoryStore::unavailable());
        let commit = store.add("memory only").expect("mutation still applies");
        assert!(matches!(commit.persist, Err(KvError::Unavailable(_))));
        assert_eq!(store.tasks().len(), 1);

        let task_id = store.tasks()[0].id.clone();
        let toggled = store.toggle_completion(&task_id).unwrap();
        assert!(matches!(toggled.persist, Err(KvError::Unavailable(_))));
        assert!(store.tasks()[0].completed);
    }
}
