mod commands;
mod data;
mod error;
mod models;
mod services;
mod state;

use std::sync::{Arc, Mutex};

use tauri::Manager;

use commands::{
    batch_commands, indexing_commands, lightbox_commands, onboarding_commands, settings_commands,
};
use data::{migrations, repository};
use services::library_api::{LibraryApi, DEFAULT_BACKEND_URL};
use services::session_store::SessionStore;
use state::{AppState, IndexingMonitorState, RetrySession};

fn init_db(
    app: &tauri::App,
) -> Result<(rusqlite::Connection, std::path::PathBuf), Box<dyn std::error::Error>> {
    let app_dir = app
        .path()
        .app_data_dir()
        .expect("failed to resolve app data dir");
    std::fs::create_dir_all(&app_dir)?;
    let db_path = app_dir.join("shoebox.db");
    let conn = rusqlite::Connection::open(&db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    migrations::run_migrations(&conn)?;
    Ok((conn, db_path))
}

fn backend_url(conn: &rusqlite::Connection) -> String {
    repository::get_setting(conn, "backend_url")
        .ok()
        .flatten()
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(log::LevelFilter::Info)
                .build(),
        )
        .setup(|app| {
            let (conn, db_path) = init_db(app)?;
            let base_url = backend_url(&conn);
            log::info!("using photo backend at {base_url}");

            let db = Arc::new(Mutex::new(conn));
            let session = SessionStore::load(db.clone())?;
            let api = LibraryApi::new(&base_url)?;

            app.manage(AppState {
                db,
                db_path,
                session,
                api,
                monitor_handle: Mutex::new(None),
                monitor_state: Arc::new(Mutex::new(IndexingMonitorState::idle())),
                retry: Mutex::new(RetrySession::default()),
                lightbox: Mutex::new(Default::default()),
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            onboarding_commands::get_onboarding_session,
            onboarding_commands::can_advance_step,
            onboarding_commands::next_onboarding_step,
            onboarding_commands::prev_onboarding_step,
            onboarding_commands::set_onboarding_step,
            onboarding_commands::add_scan_folder,
            onboarding_commands::remove_scan_folder,
            onboarding_commands::set_skip_onboarding,
            onboarding_commands::complete_onboarding,
            onboarding_commands::reset_onboarding,
            indexing_commands::start_indexing,
            indexing_commands::retry_indexing,
            indexing_commands::get_indexing_state,
            indexing_commands::stop_indexing_monitor,
            indexing_commands::continue_in_background,
            batch_commands::export_photos,
            batch_commands::delete_photos,
            batch_commands::tag_photos,
            lightbox_commands::open_lightbox,
            lightbox_commands::lightbox_go_to,
            lightbox_commands::lightbox_next,
            lightbox_commands::lightbox_prev,
            settings_commands::get_setting,
            settings_commands::set_setting,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
