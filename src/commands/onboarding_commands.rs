use tauri::{command, State};

use crate::commands::indexing_commands;
use crate::error::AppError;
use crate::models::onboarding::{OnboardingSession, OnboardingStep};
use crate::state::AppState;

fn leaving_indexing(before: u32, after: u32) -> bool {
    OnboardingStep::from_index(before) == OnboardingStep::Indexing
        && OnboardingStep::from_index(after) != OnboardingStep::Indexing
}

/// Stops the monitor whenever a step change navigates away from the
/// indexing screen, whichever direction it goes.
fn settle_monitor(state: &AppState, before: u32, after: u32) {
    if leaving_indexing(before, after) {
        indexing_commands::teardown_monitor(state);
    }
}

/// Forward guard for the current screen. Welcome and Complete always
/// advance; FolderSelection needs at least one folder; Indexing needs the
/// job to be finished (the escape hatch bypasses this entirely).
pub(crate) fn advance_allowed(state: &AppState) -> bool {
    let session = state.session.get();
    match session.step() {
        OnboardingStep::FolderSelection => session.has_folders(),
        OnboardingStep::Indexing => {
            state
                .monitor_state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .finished
        }
        OnboardingStep::Welcome | OnboardingStep::Complete => true,
    }
}

#[command]
pub fn get_onboarding_session(state: State<'_, AppState>) -> Result<OnboardingSession, AppError> {
    Ok(state.session.get())
}

#[command]
pub fn can_advance_step(state: State<'_, AppState>) -> Result<bool, AppError> {
    Ok(advance_allowed(&state))
}

#[command]
pub fn next_onboarding_step(state: State<'_, AppState>) -> Result<OnboardingSession, AppError> {
    let before = state.session.get().current_step;
    let session = state.session.next_step()?;
    settle_monitor(&state, before, session.current_step);
    Ok(session)
}

#[command]
pub fn prev_onboarding_step(state: State<'_, AppState>) -> Result<OnboardingSession, AppError> {
    let before = state.session.get().current_step;
    let session = state.session.prev_step()?;
    settle_monitor(&state, before, session.current_step);
    Ok(session)
}

#[command]
pub fn set_onboarding_step(
    step: u32,
    state: State<'_, AppState>,
) -> Result<OnboardingSession, AppError> {
    let before = state.session.get().current_step;
    let session = state.session.set_current_step(step)?;
    settle_monitor(&state, before, session.current_step);
    Ok(session)
}

#[command]
pub fn add_scan_folder(
    path: String,
    state: State<'_, AppState>,
) -> Result<OnboardingSession, AppError> {
    state.session.add_folder(&path)
}

#[command]
pub fn remove_scan_folder(
    path: String,
    state: State<'_, AppState>,
) -> Result<OnboardingSession, AppError> {
    state.session.remove_folder(&path)
}

#[command]
pub fn set_skip_onboarding(
    skip: bool,
    state: State<'_, AppState>,
) -> Result<OnboardingSession, AppError> {
    state.session.set_skip_onboarding(skip)
}

#[command]
pub fn complete_onboarding(state: State<'_, AppState>) -> Result<OnboardingSession, AppError> {
    indexing_commands::teardown_monitor(&state);
    state.session.set_completed(true)
}

#[command]
pub fn reset_onboarding(state: State<'_, AppState>) -> Result<OnboardingSession, AppError> {
    indexing_commands::teardown_monitor(&state);
    state
        .retry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .reset();
    state.session.reset()
}
