use serde::{Deserialize, Serialize};

/// Lifecycle of the backend indexing job as reported by `/index/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Indexing,
    Completed,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobProgress {
    pub total_files: u64,
    pub processed_files: u64,
    pub current_phase: String,
}

/// Snapshot of the backend job. Never mutated locally, only replaced
/// wholesale by the next poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingJobStatus {
    pub status: JobState,
    #[serde(default)]
    pub progress: JobProgress,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub estimated_completion: Option<String>,
}

impl IndexingJobStatus {
    /// The job counts as finished when the backend says so, or when it
    /// reports idle after having processed files; the backend may go idle
    /// between batches of an already-drained queue.
    pub fn is_finished(&self) -> bool {
        match self.status {
            JobState::Completed => true,
            JobState::Idle => self.progress.processed_files > 0,
            JobState::Indexing | JobState::Error => false,
        }
    }

    /// First reported error, if any. It supersedes the progress display.
    pub fn active_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}
