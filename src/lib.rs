// Learn more about Tauri commands at https://tauri.app/develop/calling-rust/
pub mod commands;
pub mod events;
pub mod gesture;
pub mod logging;
pub mod menu;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;

#[cfg(all(feature = "app", not(test)))]
use tauri::Manager;

#[cfg(all(feature = "app", not(test)))]
use crate::commands::*;
#[cfg(all(feature = "app", not(test)))]
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::FileStore;
#[cfg(all(feature = "app", not(test)))]
use crate::store::TaskStore;

#[cfg(all(feature = "app", not(test)))]
pub fn run() {
    tauri::Builder::default()
        .setup(|app| {
            let data_dir = app.path().app_data_dir()?;
            logging::init_logging(&data_dir)?;

            let mut store = TaskStore::new(FileStore::new(data_dir));
            store.load();
            app.manage(AppState::new(store));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_state,
            add_task,
            toggle_task,
            edit_task,
            delete_task,
            set_dark_mode,
            press_start,
            press_move,
            press_end,
            press_leave,
            open_menu,
            close_menu,
            request_delete,
            confirm_delete,
            cancel_delete,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
