// Engine error types.

use barrage_core::catalog::CatalogKind;
use thiserror::Error;

/// Problems with the session setup. Raised before any turn is played.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("not enough {kind} candidates: {available} available, {required} required")]
    InsufficientCandidates {
        kind: CatalogKind,
        available: usize,
        required: usize,
    },

    #[error("player count must be between 1 and {max}, got {count}")]
    PlayerCount { count: usize, max: usize },

    #[error("player {index} has an empty name")]
    EmptyPlayerName { index: usize },

    #[error("duplicate player name '{name}'")]
    DuplicatePlayerName { name: String },

    #[error("extra candidates must be between 0 and {max}, got {extra}")]
    ExtraCandidates { extra: usize, max: usize },

    #[error("could not sample {kind} candidates: {message}")]
    Sampling { kind: CatalogKind, message: String },
}

/// A command that cannot be applied in the current state. The state is
/// never modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("select one faction/role pair and one contract before confirming")]
    IncompleteSelection,

    #[error("'{id}' is not in the candidate pool")]
    UnknownCandidate { id: String },

    #[error("the draft is already complete")]
    DraftComplete,

    #[error("not allowed while {phase}")]
    WrongPhase { phase: &'static str },

    #[error("slot {slot} is out of range 1..={max}")]
    SlotOutOfRange { slot: usize, max: usize },

    #[error("bid {bid} is out of range 0..={max}")]
    BidOutOfRange { bid: u8, max: u8 },

    #[error("{holder} already bid {bid} on slot {slot}")]
    ExactBidTaken { slot: usize, bid: u8, holder: String },

    #[error("slot {slot} is held by {holder} at {holder_bid}, more than {bid}")]
    BidBelowHolder {
        slot: usize,
        bid: u8,
        holder: String,
        holder_bid: u8,
    },

    #[error("{player} holds no slot and cannot pass")]
    PassNotAllowed { player: String },

    #[error("the allocation is not complete yet")]
    NotComplete,
}
