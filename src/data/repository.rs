use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;
use crate::models::onboarding::{OnboardingSession, VersionedSession, SESSION_RECORD_VERSION};

pub const ONBOARDING_SESSION_KEY: &str = "onboarding_session";

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, AppError> {
    let value = conn
        .prepare("SELECT value FROM settings WHERE key = ?1")?
        .query_row(params![key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, chrono::Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Loads the persisted onboarding record, falling back to defaults when the
/// record is missing, carries an unsupported version, or fails to parse.
/// A bad record must never block startup.
pub fn load_session(conn: &Connection) -> Result<OnboardingSession, AppError> {
    let Some(raw) = get_setting(conn, ONBOARDING_SESSION_KEY)? else {
        return Ok(OnboardingSession::default());
    };

    match serde_json::from_str::<VersionedSession>(&raw) {
        Ok(record) if record.version == SESSION_RECORD_VERSION => Ok(record.state),
        Ok(record) => {
            log::warn!(
                "onboarding session record has unsupported version {}, starting fresh",
                record.version
            );
            Ok(OnboardingSession::default())
        }
        Err(e) => {
            log::warn!("onboarding session record is corrupt ({e}), starting fresh");
            Ok(OnboardingSession::default())
        }
    }
}

pub fn save_session(conn: &Connection, session: &OnboardingSession) -> Result<(), AppError> {
    let record = VersionedSession {
        state: session.clone(),
        version: SESSION_RECORD_VERSION,
    };
    set_setting(conn, ONBOARDING_SESSION_KEY, &serde_json::to_string(&record)?)
}
