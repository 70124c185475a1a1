use serde::Serialize;
use tauri::{command, AppHandle, Emitter, State};

use crate::error::AppError;
use crate::models::onboarding::OnboardingSession;
use crate::services::indexing_service;
use crate::state::{AppState, IndexingMonitorState, RetrySession};

pub const INDEXING_STATUS_EVENT: &str = "indexing-status";

const MAX_RETRIES_MESSAGE: &str = "Max retries reached";
const MAX_RETRIES_GUIDANCE: &str =
    "Check that the selected folders exist and are readable, then go back and start indexing again.";

/// What the indexing screen needs to render the launch and retry affordance.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchState {
    pub launched: bool,
    pub attempts_remaining: u32,
    pub exhausted: bool,
    pub last_error: Option<String>,
    pub guidance: Option<String>,
}

fn launch_state(launched: bool, retry: &RetrySession) -> LaunchState {
    let exhausted = retry.is_exhausted();
    LaunchState {
        launched,
        attempts_remaining: retry.attempts_remaining(),
        exhausted,
        last_error: retry.last_error.clone(),
        guidance: exhausted.then(|| format!("{MAX_RETRIES_MESSAGE}. {MAX_RETRIES_GUIDANCE}")),
    }
}

/// Tears down the running monitor, if any. Called on every transition that
/// leaves the indexing screen so no poll outlives it.
pub(crate) fn teardown_monitor(state: &AppState) {
    let mut guard = state
        .monitor_handle
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(handle) = guard.take() {
        indexing_service::stop_monitor(handle);
        log::debug!("indexing monitor stopped");
    }
}

fn spawn_monitor(app: &AppHandle, state: &AppState) {
    // Hold the handle lock across the whole spawn so two concurrent starts
    // cannot create duplicate monitors.
    let mut guard = state
        .monitor_handle
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_some() {
        return;
    }

    {
        let mut monitor = state
            .monitor_state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *monitor = IndexingMonitorState::idle();
    }

    let app = app.clone();
    let handle = indexing_service::start_monitor(
        state.api.clone(),
        state.monitor_state.clone(),
        move |snapshot| {
            let _ = app.emit(INDEXING_STATUS_EVENT, snapshot);
        },
    );
    *guard = Some(handle);
}

async fn attempt_launch(state: &AppState) -> Result<(), AppError> {
    let roots = state.session.get().selected_folders;
    indexing_service::launch(&state.api, &roots).await?;
    Ok(())
}

pub(crate) async fn begin_indexing<F>(
    state: &AppState,
    start_monitor: F,
) -> Result<LaunchState, AppError>
where
    F: FnOnce(&AppState),
{
    {
        // entering the indexing screen starts a fresh retry budget
        let mut retry = state
            .retry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        retry.reset();
    }

    // the launch has now been attempted, however it turns out
    state.session.set_indexing_started(true)?;

    match attempt_launch(state).await {
        Ok(()) => {
            start_monitor(state);
            let retry = state
                .retry
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Ok(launch_state(true, &retry))
        }
        Err(e) => {
            log::error!("indexing launch failed: {e}");
            let mut retry = state
                .retry
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            retry.record_failure(e.to_string());
            Ok(launch_state(false, &retry))
        }
    }
}

pub(crate) async fn retry_launch<F>(
    state: &AppState,
    start_monitor: F,
) -> Result<LaunchState, AppError>
where
    F: FnOnce(&AppState),
{
    {
        let mut retry = state
            .retry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if retry.is_exhausted() {
            return Ok(launch_state(false, &retry));
        }
        retry.begin_attempt();
    }

    match attempt_launch(state).await {
        Ok(()) => {
            {
                let mut retry = state
                    .retry
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                retry.record_success();
            }
            start_monitor(state);
            let retry = state
                .retry
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Ok(launch_state(true, &retry))
        }
        Err(e) => {
            log::error!("indexing launch retry failed: {e}");
            let mut retry = state
                .retry
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            retry.record_failure(e.to_string());
            Ok(launch_state(false, &retry))
        }
    }
}

#[command]
pub async fn start_indexing(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<LaunchState, AppError> {
    begin_indexing(&state, |s| spawn_monitor(&app, s)).await
}

#[command]
pub async fn retry_indexing(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<LaunchState, AppError> {
    retry_launch(&state, |s| spawn_monitor(&app, s)).await
}

#[command]
pub fn get_indexing_state(state: State<'_, AppState>) -> Result<IndexingMonitorState, AppError> {
    Ok(state
        .monitor_state
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone())
}

#[command]
pub fn stop_indexing_monitor(state: State<'_, AppState>) -> Result<(), AppError> {
    teardown_monitor(&state);
    Ok(())
}

pub(crate) fn escape_to_background(state: &AppState) -> Result<OnboardingSession, AppError> {
    // the backend job keeps running unattended; only the polling stops
    teardown_monitor(state);
    state.session.set_completed(true)
}

/// The escape hatch: marks onboarding complete immediately, bypassing the
/// indexing exit guard.
#[command]
pub fn continue_in_background(state: State<'_, AppState>) -> Result<OnboardingSession, AppError> {
    escape_to_background(&state)
}
