//! Error taxonomy shared by the content services

use thiserror::Error;

/// Errors returned by the post, comment and category services.
///
/// Validation runs before any write, so `Validation`, `NotFound` and
/// `Conflict` always leave the store unchanged.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Input violates a field rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage temporarily unavailable; the call may be retried
    #[error("Storage temporarily unavailable: {0}")]
    Transient(String),

    /// Any other storage failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Whether retrying the same call might succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// SQLite primary result codes for BUSY and LOCKED
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// MySQL lock wait timeout and deadlock
const MYSQL_LOCK_WAIT_TIMEOUT: &str = "1205";
const MYSQL_DEADLOCK: &str = "1213";

impl From<anyhow::Error> for ContentError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{:#}", err);

        let Some(sqlx_err) = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<sqlx::Error>())
        else {
            return Self::Internal(message);
        };

        match sqlx_err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::WorkerCrashed => Self::Transient(message),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    Self::Conflict(message)
                } else if db_err.is_foreign_key_violation() {
                    Self::NotFound(message)
                } else if db_err.code().is_some_and(|code| is_transient_code(&code)) {
                    Self::Transient(message)
                } else {
                    Self::Internal(message)
                }
            }
            _ => Self::Internal(message),
        }
    }
}

fn is_transient_code(code: &str) -> bool {
    if code == MYSQL_LOCK_WAIT_TIMEOUT || code == MYSQL_DEADLOCK {
        return true;
    }
    // SQLite reports extended codes; the low byte is the primary code
    code.parse::<i32>()
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}
