use tauri::{command, State};

use crate::data::repository;
use crate::error::AppError;
use crate::state::AppState;

/// Keys the generic settings endpoints may not touch. The onboarding record
/// has exactly one writer, the session store.
const BLOCKED_SETTINGS_KEYS: &[&str] = &[repository::ONBOARDING_SESSION_KEY];

fn is_blocked(key: &str) -> bool {
    BLOCKED_SETTINGS_KEYS.contains(&key)
}

#[command]
pub fn get_setting(key: String, state: State<'_, AppState>) -> Result<Option<String>, AppError> {
    if is_blocked(&key) {
        return Err(AppError::General(format!(
            "Setting '{key}' cannot be accessed via generic endpoint"
        )));
    }
    let conn = state
        .db
        .lock()
        .map_err(|e| AppError::General(e.to_string()))?;
    repository::get_setting(&conn, &key)
}

#[command]
pub fn set_setting(
    key: String,
    value: String,
    state: State<'_, AppState>,
) -> Result<(), AppError> {
    if is_blocked(&key) {
        return Err(AppError::General(format!(
            "Setting '{key}' cannot be modified via generic endpoint"
        )));
    }
    let conn = state
        .db
        .lock()
        .map_err(|e| AppError::General(e.to_string()))?;
    repository::set_setting(&conn, &key, &value)
}
