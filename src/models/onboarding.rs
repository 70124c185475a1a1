use serde::{Deserialize, Serialize};

pub const SESSION_RECORD_VERSION: u32 = 1;

/// Ordered wizard screens. Step indices beyond `Complete` have no screen of
/// their own and render as `Welcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingStep {
    Welcome,
    FolderSelection,
    Indexing,
    Complete,
}

impl OnboardingStep {
    pub const LAST_INDEX: u32 = 3;

    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Self::FolderSelection,
            2 => Self::Indexing,
            3 => Self::Complete,
            _ => Self::Welcome,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingSession {
    pub completed: bool,
    pub current_step: u32,
    pub selected_folders: Vec<String>,
    pub indexing_started: bool,
    pub skip_onboarding: bool,
}

impl OnboardingSession {
    pub fn step(&self) -> OnboardingStep {
        OnboardingStep::from_index(self.current_step)
    }

    /// Moves forward without an upper bound; screens are responsible for
    /// guarding the transition. Indices past the last screen render as
    /// Welcome, so log when that happens instead of failing.
    pub fn next_step(&mut self) {
        self.current_step += 1;
        if self.current_step > OnboardingStep::LAST_INDEX {
            log::warn!(
                "onboarding advanced past the last step (now at {})",
                self.current_step
            );
        }
    }

    pub fn prev_step(&mut self) {
        self.current_step = self.current_step.saturating_sub(1);
    }

    pub fn set_step(&mut self, step: u32) {
        self.current_step = step;
    }

    /// Appends unconditionally. Duplicate suppression is the caller's
    /// responsibility.
    pub fn add_folder(&mut self, path: impl Into<String>) {
        self.selected_folders.push(path.into());
    }

    /// Removes every occurrence of `path`, preserving the order of the rest.
    pub fn remove_folder(&mut self, path: &str) {
        self.selected_folders.retain(|p| p != path);
    }

    pub fn has_folders(&self) -> bool {
        !self.selected_folders.is_empty()
    }
}

/// On-disk shape of the persisted session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedSession {
    pub state: OnboardingSession,
    pub version: u32,
}
