use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::data::repository;
use crate::error::AppError;
use crate::models::onboarding::OnboardingSession;

/// The single writer for the persisted onboarding record. Every mutator
/// updates the in-memory copy and writes it through to the database in the
/// same call, so readers always observe the latest write.
pub struct SessionStore {
    db: Arc<Mutex<Connection>>,
    current: Mutex<OnboardingSession>,
}

impl SessionStore {
    pub fn load(db: Arc<Mutex<Connection>>) -> Result<Self, AppError> {
        let session = {
            let conn = db.lock().map_err(|e| AppError::General(e.to_string()))?;
            repository::load_session(&conn)?
        };
        Ok(Self {
            db,
            current: Mutex::new(session),
        })
    }

    pub fn get(&self) -> OnboardingSession {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn mutate<F>(&self, apply: F) -> Result<OnboardingSession, AppError>
    where
        F: FnOnce(&mut OnboardingSession),
    {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut current);
        let conn = self.db.lock().map_err(|e| AppError::General(e.to_string()))?;
        repository::save_session(&conn, &current)?;
        Ok(current.clone())
    }

    pub fn set_completed(&self, completed: bool) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.completed = completed)
    }

    pub fn next_step(&self) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.next_step())
    }

    pub fn prev_step(&self) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.prev_step())
    }

    pub fn set_current_step(&self, step: u32) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.set_step(step))
    }

    pub fn add_folder(&self, path: &str) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.add_folder(path))
    }

    pub fn remove_folder(&self, path: &str) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.remove_folder(path))
    }

    pub fn set_indexing_started(&self, started: bool) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.indexing_started = started)
    }

    pub fn set_skip_onboarding(&self, skip: bool) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| s.skip_onboarding = skip)
    }

    pub fn reset(&self) -> Result<OnboardingSession, AppError> {
        self.mutate(|s| *s = OnboardingSession::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::migrations;

    fn test_store() -> SessionStore {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();
        SessionStore::load(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn mutations_write_through_to_the_database() {
        let store = test_store();
        store.add_folder("/pics").unwrap();
        store.set_current_step(2).unwrap();

        // a fresh load from the same connection sees the write
        let conn = store.db.clone();
        let reloaded = {
            let guard = conn.lock().unwrap();
            repository::load_session(&guard).unwrap()
        };
        assert_eq!(reloaded.selected_folders, vec!["/pics"]);
        assert_eq!(reloaded.current_step, 2);
    }

    #[test]
    fn reset_is_idempotent() {
        let store = test_store();
        store.add_folder("/a").unwrap();
        store.set_completed(true).unwrap();

        let first = store.reset().unwrap();
        let second = store.reset().unwrap();
        assert_eq!(first, OnboardingSession::default());
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_folders_accumulate() {
        let store = test_store();
        store.add_folder("/a").unwrap();
        let session = store.add_folder("/a").unwrap();
        assert_eq!(session.selected_folders, vec!["/a", "/a"]);

        let session = store.remove_folder("/a").unwrap();
        assert!(session.selected_folders.is_empty());
    }
}
