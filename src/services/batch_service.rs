use crate::error::AppError;
use crate::models::batch::{DeleteRequest, ExportRequest, JobCreated, TagRequest};
use crate::services::library_api::LibraryApi;

/// Preconditions the screens use to enable each batch action. Dispatch
/// re-checks them so a stale screen cannot submit an invalid job.
pub fn can_export(photo_ids: &[String], destination: &str) -> bool {
    !photo_ids.is_empty() && !destination.trim().is_empty()
}

pub fn can_delete(photo_ids: &[String]) -> bool {
    !photo_ids.is_empty()
}

pub fn can_tag(photo_ids: &[String], tags: &[String]) -> bool {
    !photo_ids.is_empty() && !tags.is_empty()
}

pub async fn export(api: &LibraryApi, req: &ExportRequest) -> Result<JobCreated, AppError> {
    if !can_export(&req.photo_ids, &req.destination) {
        return Err(AppError::General(
            "export needs a selection and a destination".to_string(),
        ));
    }
    let created = api.create_export_job(req).await?;
    log::info!(
        "export job {} created for {} photos",
        created.job_id,
        req.photo_ids.len()
    );
    Ok(created)
}

pub async fn delete(api: &LibraryApi, req: &DeleteRequest) -> Result<JobCreated, AppError> {
    if !can_delete(&req.photo_ids) {
        return Err(AppError::General("delete needs a selection".to_string()));
    }
    let created = api.create_delete_job(req).await?;
    log::info!(
        "delete job {} created for {} photos (permanent: {})",
        created.job_id,
        req.photo_ids.len(),
        req.permanent
    );
    Ok(created)
}

pub async fn tag(api: &LibraryApi, req: &TagRequest) -> Result<JobCreated, AppError> {
    if !can_tag(&req.photo_ids, &req.tags) {
        return Err(AppError::General(
            "tagging needs a selection and at least one tag".to_string(),
        ));
    }
    let created = api.create_tag_job(req).await?;
    log::info!(
        "tag job {} created for {} photos",
        created.job_id,
        req.photo_ids.len()
    );
    Ok(created)
}
