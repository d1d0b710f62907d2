// Messages between the app event loop and the TUI.

use std::collections::HashMap;

use barrage_core::record::{DraftMethod, SessionRecord};
use barrage_draft::session::SessionView;

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Pick the allocation method for the sampled session.
    ChooseMethod(DraftMethod),
    TogglePair(String),
    ToggleContract(String),
    ConfirmPick,
    PlaceBid { slot: usize, bid: u8 },
    PassTurn,
    /// Retry storing a finished allocation.
    SaveSession,
    /// Move from the result screen to score entry.
    OpenScoring,
    /// Final scores by player name.
    SubmitScores(HashMap<String, i32>),
    /// Leave score entry without storing anything.
    SkipScoring,
    /// Throw away everything in progress and sample a new session.
    Reset,
    Quit,
}

// ---------------------------------------------------------------------------
// app -> TUI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
    Notice(String),
    Error(String),
}

/// Which screen the TUI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Sampled candidates shown, waiting for a method.
    Setup,
    /// Bidding or drafting.
    Allocation,
    Results,
    Scoring,
}

/// A session waiting for final scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringTarget {
    pub session_id: i64,
    pub created_at: Option<String>,
    pub record: SessionRecord,
    /// Scores already stored for some players.
    pub entered: HashMap<String, i32>,
}

/// Everything the TUI renders.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub screen: Screen,
    pub players: Vec<String>,
    pub extra_candidates: usize,
    pub board_variant: String,
    pub session: Option<SessionView>,
    /// The assembled record once the allocation is complete.
    pub record: Option<SessionRecord>,
    /// Store id once the record has been appended.
    pub saved_session_id: Option<i64>,
    pub scoring: Option<ScoringTarget>,
    /// Last setup failure, shown on the setup screen.
    pub setup_error: Option<String>,
}
