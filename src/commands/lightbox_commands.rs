use serde::Serialize;
use tauri::{command, State};

use crate::error::AppError;
use crate::models::lightbox::Lightbox;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct LightboxPosition {
    pub index: usize,
    pub photo_id: Option<String>,
    pub count: usize,
}

fn position(lightbox: &Lightbox) -> LightboxPosition {
    LightboxPosition {
        index: lightbox.index(),
        photo_id: lightbox.current().map(str::to_string),
        count: lightbox.len(),
    }
}

#[command]
pub fn open_lightbox(
    photo_ids: Vec<String>,
    state: State<'_, AppState>,
) -> Result<LightboxPosition, AppError> {
    let mut guard = state
        .lightbox
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Lightbox::new(photo_ids);
    Ok(position(&guard))
}

#[command]
pub fn lightbox_go_to(
    index: i64,
    state: State<'_, AppState>,
) -> Result<LightboxPosition, AppError> {
    let mut guard = state
        .lightbox
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.go_to(index);
    Ok(position(&guard))
}

#[command]
pub fn lightbox_next(state: State<'_, AppState>) -> Result<LightboxPosition, AppError> {
    let mut guard = state
        .lightbox
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.next();
    Ok(position(&guard))
}

#[command]
pub fn lightbox_prev(state: State<'_, AppState>) -> Result<LightboxPosition, AppError> {
    let mut guard = state
        .lightbox
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.prev();
    Ok(position(&guard))
}
