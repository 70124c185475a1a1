use tauri::{command, State};

use crate::error::AppError;
use crate::models::batch::{DeleteRequest, ExportRequest, JobCreated, TagRequest};
use crate::services::batch_service;
use crate::state::AppState;

#[command]
pub async fn export_photos(
    request: ExportRequest,
    state: State<'_, AppState>,
) -> Result<JobCreated, AppError> {
    batch_service::export(&state.api, &request).await
}

#[command]
pub async fn delete_photos(
    request: DeleteRequest,
    state: State<'_, AppState>,
) -> Result<JobCreated, AppError> {
    batch_service::delete(&state.api, &request).await
}

#[command]
pub async fn tag_photos(
    request: TagRequest,
    state: State<'_, AppState>,
) -> Result<JobCreated, AppError> {
    batch_service::tag(&state.api, &request).await
}
