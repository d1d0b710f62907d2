// Runtime error taxonomy surfaced to the UI.

use barrage_draft::{ConfigurationError, SelectionError};
use thiserror::Error;

/// A record store call failed. The in-memory session is kept so the user
/// can retry.
#[derive(Debug, Error)]
#[error("record store failed: {0:#}")]
pub struct PersistenceError(pub anyhow::Error);

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InvalidSelection(#[from] SelectionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("no session is waiting for scores")]
    NothingToScore,

    #[error("scores rejected: session {session_id} does not have those players")]
    ScoresRejected { session_id: i64 },

    #[error("no session in progress; reset to sample a new one")]
    NoSession,
}

impl AppError {
    pub fn persistence(err: anyhow::Error) -> Self {
        AppError::Persistence(PersistenceError(err))
    }
}
