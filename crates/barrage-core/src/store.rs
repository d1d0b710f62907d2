// Record store abstraction consumed by the application orchestrator.

use std::collections::HashMap;

use anyhow::Result;

use crate::db::Database;
use crate::record::{SessionRecord, SessionSnapshot, UsageCounts};

/// Persistence operations the orchestrator needs. `Database` is the
/// production implementation; tests substitute failing or in-memory stores.
pub trait RecordStore: Send + Sync {
    /// Append a finished allocation, returning its session id.
    fn append_session(&self, record: &SessionRecord) -> Result<i64>;

    /// The most recent session still waiting for final scores.
    fn find_unscored_session(&self) -> Result<Option<SessionSnapshot>>;

    /// Store final scores. `Ok(false)` if the session or a player name is unknown.
    fn apply_final_scores(&self, session_id: i64, scores: &HashMap<String, i32>) -> Result<bool>;

    /// Faction and role appearance counts over the last `k` sessions.
    fn recent_usage_counts(&self, k: usize) -> Result<UsageCounts>;
}

impl RecordStore for Database {
    fn append_session(&self, record: &SessionRecord) -> Result<i64> {
        Database::append_session(self, record)
    }

    fn find_unscored_session(&self) -> Result<Option<SessionSnapshot>> {
        Database::find_unscored_session(self)
    }

    fn apply_final_scores(&self, session_id: i64, scores: &HashMap<String, i32>) -> Result<bool> {
        Database::apply_final_scores(self, session_id, scores)
    }

    fn recent_usage_counts(&self, k: usize) -> Result<UsageCounts> {
        Database::recent_usage_counts(self, k)
    }
}
