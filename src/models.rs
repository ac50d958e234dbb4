use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Timestamp = i64;

/// Creation-time cap on task text, in characters. Longer input is silently
/// truncated so a runaway paste cannot blow the storage budget.
pub const TEXT_MAX_CHARS: usize = 1000;

pub(crate) fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}

/// One to-do item. Field names on the wire are camelCase, matching the
/// persisted JSON layout (`id`, `text`, `completed`, `createdAt`, `updatedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Builds a new record from raw user input.
    ///
    /// Returns `None` when the input trims to nothing. Otherwise the text is
    /// capped at [`TEXT_MAX_CHARS`] characters, the id is a fresh UUIDv7
    /// (millisecond time component plus randomness, so ids stay unique and
    /// roughly ordered), and both timestamps are set to the current time.
    pub fn create(raw_text: &str) -> Option<Self> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let text = match trimmed.char_indices().nth(TEXT_MAX_CHARS) {
            Some((byte_offset, _)) => trimmed[..byte_offset].to_string(),
            None => trimmed.to_string(),
        };
        let now = now_millis();
        Some(Self {
            id: Uuid::now_v7().to_string(),
            text,
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }
}
