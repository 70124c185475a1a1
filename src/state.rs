use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::models::indexing::IndexingJobStatus;
use crate::models::lightbox::Lightbox;
use crate::services::indexing_service::MonitorHandle;
use crate::services::library_api::LibraryApi;
use crate::services::session_store::SessionStore;

pub const MAX_LAUNCH_RETRIES: u32 = 3;

/// Derived, webview-facing view of the indexing job. The monitor task
/// replaces the derived fields on every poll tick; `elapsed_secs`,
/// `background_continue_available` and `tip` are owned by the slower timers
/// and survive snapshot replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingMonitorState {
    pub snapshot: Option<IndexingJobStatus>,
    pub phase_label: String,
    pub percent: Option<u8>,
    pub indeterminate: bool,
    pub eta: Option<String>,
    pub active_error: Option<String>,
    pub finished: bool,
    pub elapsed_secs: u64,
    pub background_continue_available: bool,
    pub tip: String,
    pub last_polled_at: Option<String>,
}

impl IndexingMonitorState {
    pub fn idle() -> Self {
        Self {
            snapshot: None,
            phase_label: crate::services::indexing_service::phase_label(""),
            percent: None,
            indeterminate: true,
            eta: None,
            active_error: None,
            finished: false,
            elapsed_secs: 0,
            background_continue_available: false,
            tip: crate::services::indexing_service::tip_at(0).to_string(),
            last_polled_at: None,
        }
    }
}

/// Launch-failure retry budget for one visit to the indexing screen.
/// In-memory only; a fresh visit starts a fresh budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrySession {
    pub attempts: u32,
    pub is_retrying: bool,
    pub last_error: Option<String>,
}

impl RetrySession {
    pub fn attempts_remaining(&self) -> u32 {
        MAX_LAUNCH_RETRIES.saturating_sub(self.attempts)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_LAUNCH_RETRIES
    }

    pub fn begin_attempt(&mut self) {
        self.attempts += 1;
        self.is_retrying = true;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
        self.is_retrying = false;
    }

    pub fn record_success(&mut self) {
        self.last_error = None;
        self.is_retrying = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct AppState {
    pub db: Arc<Mutex<rusqlite::Connection>>,
    pub db_path: PathBuf,
    pub session: SessionStore,
    pub api: LibraryApi,
    pub monitor_handle: Mutex<Option<MonitorHandle>>,
    pub monitor_state: Arc<Mutex<IndexingMonitorState>>,
    pub retry: Mutex<RetrySession>,
    pub lightbox: Mutex<Lightbox>,
}
