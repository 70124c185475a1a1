use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::models::batch::{DeleteRequest, ExportRequest, JobCreated, TagRequest};
use crate::models::indexing::IndexingJobStatus;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:7878";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of an index start request. The backend answers 409 when a job is
/// already running; callers treat that the same as a fresh start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Thin client for the photo-library backend daemon.
#[derive(Clone)]
pub struct LibraryApi {
    http: reqwest::Client,
    base_url: String,
}

impl LibraryApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn set_scan_roots(&self, roots: &[String]) -> Result<(), AppError> {
        let resp = self
            .http
            .post(self.url("/config/roots"))
            .json(&json!({ "roots": roots }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Backend(format!(
                "setting scan roots failed with status {}",
                resp.status()
            )));
        }
        Ok(())
    }

    pub async fn start_indexing(&self, full: bool) -> Result<StartOutcome, AppError> {
        let resp = self
            .http
            .post(self.url("/index/start"))
            .json(&json!({ "full": full }))
            .send()
            .await?;
        match resp.status() {
            status if status.is_success() => Ok(StartOutcome::Started),
            StatusCode::CONFLICT => Ok(StartOutcome::AlreadyRunning),
            status => Err(AppError::Backend(format!(
                "index start failed with status {status}"
            ))),
        }
    }

    pub async fn fetch_status(&self) -> Result<IndexingJobStatus, AppError> {
        let resp = self.http.get(self.url("/index/status")).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Backend(format!(
                "status fetch failed with status {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    async fn create_job<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<JobCreated, AppError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Backend(format!(
                "job creation at {path} failed with status {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    pub async fn create_export_job(&self, req: &ExportRequest) -> Result<JobCreated, AppError> {
        self.create_job("/batch/export", req).await
    }

    pub async fn create_delete_job(&self, req: &DeleteRequest) -> Result<JobCreated, AppError> {
        self.create_job("/batch/delete", req).await
    }

    pub async fn create_tag_job(&self, req: &TagRequest) -> Result<JobCreated, AppError> {
        self.create_job("/batch/tag", req).await
    }
}
