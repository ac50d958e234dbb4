use crate::events::{LongPressPayload, NoticeKind, StatePayload, StorageNoticePayload};
use crate::models::Task;
use crate::state::AppState;
use crate::storage::{KeyValueStore, KvError};
use crate::store::EditOutcome;

#[cfg(all(feature = "app", not(test)))]
use crate::events::{
    EVENT_HAPTIC_PULSE, EVENT_LONG_PRESS, EVENT_STATE_UPDATED, EVENT_STORAGE_NOTICE,
};
#[cfg(all(feature = "app", not(test)))]
use crate::gesture::press_delay;
#[cfg(all(feature = "app", not(test)))]
use crate::gesture::PressOrigin;
#[cfg(all(feature = "app", not(test)))]
use crate::state::SharedState;
#[cfg(all(feature = "app", not(test)))]
use tauri::{AppHandle, Emitter, Runtime, State};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Seam between command logic and the desktop shell, so every command body is
/// testable without a running webview.
pub trait CommandCtx {
    fn emit_state_updated(&self, payload: StatePayload);
    fn emit_long_press(&self, payload: LongPressPayload);
    fn emit_storage_notice(&self, payload: StorageNoticePayload);
    /// Best-effort; platforms without an actuator ignore it.
    fn haptic_pulse(&self);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

/// Accepted but nothing changed: empty input, or a target id that no longer
/// exists. Not an error; menus can outlive the records under them.
fn noop<T>() -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: None,
        error: None,
    }
}

fn emit_state<S: KeyValueStore>(ctx: &impl CommandCtx, state: &AppState<S>) {
    ctx.emit_state_updated(StatePayload {
        tasks: state.tasks(),
        dark_mode: state.dark_mode(),
    });
}

fn report_persist<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    persist: &Result<(), KvError>,
) {
    let Err(error) = persist else { return };
    log::error!("task write failed: {error}");
    if !state.should_notice(error) {
        return;
    }
    let payload = match error {
        KvError::QuotaExceeded => StorageNoticePayload {
            kind: NoticeKind::QuotaExceeded,
            message: "Storage quota exceeded. Delete some tasks to free up space.".to_string(),
        },
        KvError::Unavailable(_) => StorageNoticePayload {
            kind: NoticeKind::Unavailable,
            message: "Unable to save tasks. Changes will be kept for this session only."
                .to_string(),
        },
    };
    ctx.emit_storage_notice(payload);
}

pub fn load_state_impl<S: KeyValueStore>(state: &AppState<S>) -> CommandResult<StatePayload> {
    state.load();
    ok(StatePayload {
        tasks: state.tasks(),
        dark_mode: state.dark_mode(),
    })
}

pub fn add_task_impl<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    text: String,
) -> CommandResult<Task> {
    let Some(commit) = state.add_task(&text) else {
        return noop();
    };
    report_persist(ctx, state, &commit.persist);
    emit_state(ctx, state);
    ok(commit.value)
}

pub fn toggle_task_impl<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    task_id: String,
) -> CommandResult<Task> {
    let Some(commit) = state.toggle_task(&task_id) else {
        return noop();
    };
    report_persist(ctx, state, &commit.persist);
    emit_state(ctx, state);
    ok(commit.value)
}

pub fn edit_task_impl<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    task_id: String,
    text: String,
) -> CommandResult<EditOutcome> {
    let Some(commit) = state.edit_task(&task_id, &text) else {
        return noop();
    };
    report_persist(ctx, state, &commit.persist);
    emit_state(ctx, state);
    ok(commit.value)
}

pub fn delete_task_impl<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    task_id: String,
) -> CommandResult<bool> {
    let Some(commit) = state.delete_task(&task_id) else {
        return noop();
    };
    report_persist(ctx, state, &commit.persist);
    emit_state(ctx, state);
    ok(true)
}

pub fn set_dark_mode_impl<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    enabled: bool,
) -> CommandResult<bool> {
    state.set_dark_mode(enabled);
    emit_state(ctx, state);
    ok(enabled)
}

pub fn open_menu_impl<S: KeyValueStore>(state: &AppState<S>, task_id: String) -> CommandResult<bool> {
    if state.open_menu(&task_id) {
        ok(true)
    } else {
        noop()
    }
}

pub fn close_menu_impl<S: KeyValueStore>(state: &AppState<S>) -> CommandResult<bool> {
    state.close_menu();
    ok(true)
}

pub fn request_delete_impl<S: KeyValueStore>(state: &AppState<S>) -> CommandResult<String> {
    match state.request_delete() {
        Some(task_id) => ok(task_id),
        None => noop(),
    }
}

pub fn confirm_delete_impl<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
) -> CommandResult<bool> {
    let Some(commit) = state.confirm_delete() else {
        return noop();
    };
    report_persist(ctx, state, &commit.persist);
    emit_state(ctx, state);
    ok(true)
}

pub fn cancel_delete_impl<S: KeyValueStore>(state: &AppState<S>) -> CommandResult<bool> {
    state.cancel_delete();
    ok(true)
}

/// Resolves an elapsed press timer against the current state. Fires the
/// long-press signal and a haptic pulse only when the press is still live.
pub fn long_press_fired<S: KeyValueStore>(
    ctx: &impl CommandCtx,
    state: &AppState<S>,
    generation: u64,
) -> Option<String> {
    let task_id = state.long_press_elapsed(generation)?;
    ctx.haptic_pulse();
    ctx.emit_long_press(LongPressPayload {
        task_id: task_id.clone(),
    });
    Some(task_id)
}

#[cfg(all(feature = "app", not(test)))]
struct TauriCommandCtx<'a, R: Runtime> {
    app: &'a AppHandle<R>,
}

#[cfg(all(feature = "app", not(test)))]
impl<R: Runtime> CommandCtx for TauriCommandCtx<'_, R> {
    fn emit_state_updated(&self, payload: StatePayload) {
        let _ = self.app.emit(EVENT_STATE_UPDATED, payload);
    }

    fn emit_long_press(&self, payload: LongPressPayload) {
        let _ = self.app.emit(EVENT_LONG_PRESS, payload);
    }

    fn emit_storage_notice(&self, payload: StorageNoticePayload) {
        let _ = self.app.emit(EVENT_STORAGE_NOTICE, payload);
    }

    fn haptic_pulse(&self) {
        // The webview decides whether the platform can vibrate.
        let _ = self.app.emit(EVENT_HAPTIC_PULSE, ());
    }
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn load_state(state: State<'_, SharedState>) -> CommandResult<StatePayload> {
    load_state_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn add_task(
    app: AppHandle,
    state: State<'_, SharedState>,
    text: String,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    add_task_impl(&ctx, state.inner(), text)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn toggle_task(
    app: AppHandle,
    state: State<'_, SharedState>,
    task_id: String,
) -> CommandResult<Task> {
    let ctx = TauriCommandCtx { app: &app };
    toggle_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn edit_task(
    app: AppHandle,
    state: State<'_, SharedState>,
    task_id: String,
    text: String,
) -> CommandResult<EditOutcome> {
    let ctx = TauriCommandCtx { app: &app };
    edit_task_impl(&ctx, state.inner(), task_id, text)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn delete_task(
    app: AppHandle,
    state: State<'_, SharedState>,
    task_id: String,
) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    delete_task_impl(&ctx, state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn set_dark_mode(
    app: AppHandle,
    state: State<'_, SharedState>,
    enabled: bool,
) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    set_dark_mode_impl(&ctx, state.inner(), enabled)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn press_start(
    app: AppHandle,
    state: State<'_, SharedState>,
    task_id: String,
    origin: PressOrigin,
) -> CommandResult<bool> {
    let Some(armed) = state.press_start(&task_id, origin) else {
        return ok(false);
    };
    let state = state.inner().clone();
    tauri::async_runtime::spawn(async move {
        let generation = press_delay(&armed).await;
        let ctx = TauriCommandCtx { app: &app };
        long_press_fired(&ctx, &state, generation);
    });
    ok(true)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn press_move(state: State<'_, SharedState>) -> CommandResult<bool> {
    state.press_move();
    ok(true)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn press_end(state: State<'_, SharedState>) -> CommandResult<bool> {
    state.press_end();
    ok(true)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn press_leave(state: State<'_, SharedState>) -> CommandResult<bool> {
    state.press_leave();
    ok(true)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn open_menu(state: State<'_, SharedState>, task_id: String) -> CommandResult<bool> {
    open_menu_impl(state.inner(), task_id)
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn close_menu(state: State<'_, SharedState>) -> CommandResult<bool> {
    close_menu_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn request_delete(state: State<'_, SharedState>) -> CommandResult<String> {
    request_delete_impl(state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn confirm_delete(app: AppHandle, state: State<'_, SharedState>) -> CommandResult<bool> {
    let ctx = TauriCommandCtx { app: &app };
    confirm_delete_impl(&ctx, state.inner())
}

#[cfg(all(feature = "app", not(test)))]
#[tauri::command]
pub fn cancel_delete(state: State<'_, SharedState>) -> CommandResult<bool> {
    cancel_delete_impl(state.inner())
}
