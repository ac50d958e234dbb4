use crate::models::Task;

pub const EVENT_STATE_UPDATED: &str = "state_updated";
pub const EVENT_LONG_PRESS: &str = "long_press";
pub const EVENT_STORAGE_NOTICE: &str = "storage_notice";
pub const EVENT_HAPTIC_PULSE: &str = "haptic_pulse";

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    pub tasks: Vec<Task>,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongPressPayload {
    pub task_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    QuotaExceeded,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageNoticePayload {
    pub kind: NoticeKind,
    pub message: String,
}
