use serde::{Deserialize, Serialize};

/// How a tag job applies its tag list to the selected photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagOperation {
    Add,
    Remove,
    Replace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub photo_ids: Vec<String>,
    pub destination: String,
    pub format: String,
    pub max_dimension: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub photo_ids: Vec<String>,
    pub permanent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRequest {
    pub photo_ids: Vec<String>,
    pub tags: Vec<String>,
    pub operation: TagOperation,
}

/// The backend's acknowledgement of a created job. Jobs are fire-and-forget;
/// nothing in the client tracks their completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCreated {
    pub job_id: String,
}
