// Session record types shared by the allocation engine and the record store.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session limits
// ---------------------------------------------------------------------------

/// Largest table the setup supports.
pub const MAX_PLAYERS: usize = 5;

/// Largest number of surplus faction/role pairs offered on top of one per player.
pub const MAX_EXTRA_CANDIDATES: usize = 2;

/// Victory points every player starts with before any auction bid is paid.
pub const BASE_STARTING_SCORE: i32 = 10;

// ---------------------------------------------------------------------------
// DraftMethod
// ---------------------------------------------------------------------------

/// How factions, roles and contracts are allocated for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftMethod {
    /// Round-robin draft in reverse first-round order.
    Normal,
    /// Turn-order auction followed by a draft in reverse auction order.
    Auction,
}

impl DraftMethod {
    /// Parse the persisted string form (`"normal"` / `"auction"`).
    pub fn from_str_method(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(DraftMethod::Normal),
            "auction" => Some(DraftMethod::Auction),
            _ => None,
        }
    }

    /// The string stored in the `sessions.method` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftMethod::Normal => "normal",
            DraftMethod::Auction => "auction",
        }
    }
}

impl fmt::Display for DraftMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What one player ended up with after the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResult {
    pub player: String,
    pub faction: String,
    pub role: String,
    pub contract: String,
    /// Victory points paid in the turn-order auction. `None` for normal drafts.
    pub bid: Option<u8>,
    /// Score entering the game proper. May be negative after a large bid.
    pub starting_score: i32,
}

/// A finished allocation, shaped the way the record store appends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub player_count: usize,
    /// Seating order fixed at session start.
    pub turn_sequence: Vec<String>,
    /// One entry per player, ordered by `turn_sequence`.
    pub results: Vec<DraftResult>,
    /// Who takes the first turn of round one, second turn, and so on.
    pub first_round_order: Vec<String>,
    pub method: DraftMethod,
    pub board_variant: String,
}

impl SessionRecord {
    /// 1-based first-round turn of `player`, if they took part.
    pub fn first_round_position(&self, player: &str) -> Option<usize> {
        self.first_round_order
            .iter()
            .position(|p| p == player)
            .map(|i| i + 1)
    }

    /// Look up the result row for `player`.
    pub fn result_for(&self, player: &str) -> Option<&DraftResult> {
        self.results.iter().find(|r| r.player == player)
    }

    /// Results sorted by first-round turn, the order the result screen uses.
    pub fn results_by_first_round(&self) -> Vec<&DraftResult> {
        let mut rows: Vec<&DraftResult> = self.results.iter().collect();
        rows.sort_by_key(|r| self.first_round_position(&r.player).unwrap_or(usize::MAX));
        rows
    }
}

/// A session as read back from the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: i64,
    /// ISO-8601 UTC timestamp assigned when the session was appended.
    pub created_at: String,
    pub record: SessionRecord,
    /// Final scores entered after the game. Empty until scored.
    pub final_scores: HashMap<String, i32>,
}

impl SessionSnapshot {
    /// Whether every player in the session has a final score.
    pub fn is_scored(&self) -> bool {
        self.record
            .turn_sequence
            .iter()
            .all(|p| self.final_scores.contains_key(p))
    }
}

// ---------------------------------------------------------------------------
// Usage history
// ---------------------------------------------------------------------------

/// How often each faction and role appeared in recent completed sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    pub factions: HashMap<String, u32>,
    pub roles: HashMap<String, u32>,
}

impl UsageCounts {
    pub fn faction_count(&self, name: &str) -> u32 {
        self.factions.get(name).copied().unwrap_or(0)
    }

    pub fn role_count(&self, name: &str) -> u32 {
        self.roles.get(name).copied().unwrap_or(0)
    }
}
