// Turn-order auction.
//
// Players take turns round-robin over the seating order, bidding victory
// points for turn-order slots 1..=N. A higher bid displaces the current
// holder. Once every player holds a slot the board fixes the first-round
// order, and the faction/contract draft runs in the reverse of it with each
// player's starting score reduced by what they paid.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::draft::NormalDraft;
use crate::error::SelectionError;
use crate::players::TurnSequence;
use crate::pool::CandidatePool;

/// Highest bid a player may place on a slot.
pub const MAX_BID: u8 = 15;

/// A player's standing in the bidding phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAuctionStatus {
    /// Has not bid yet.
    Bidding,
    Placed { slot: usize, bid: u8 },
    /// Lost their slot to a higher bid and must bid again.
    Displaced,
}

/// Who holds a slot and for how much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub player: String,
    pub bid: u8,
}

/// What an accepted bid changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOutcome {
    pub player: String,
    pub slot: usize,
    pub bid: u8,
    /// Previous holder knocked off the slot.
    pub displaced: Option<String>,
    /// Player whose turn was skipped because they hold the last held slot.
    pub skipped: Option<String>,
    /// Bidding has ended and the draft has begun.
    pub resolved: bool,
}

/// Turn order fixed by the finished auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionResolution {
    /// `final_turn_order[i]` holds slot `i + 1`.
    pub final_turn_order: Vec<String>,
    /// Draft pick order, the reverse of `final_turn_order`.
    pub draft_order: Vec<String>,
    pub bids: HashMap<String, u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Stage {
    Bidding {
        turn_index: usize,
        pool: CandidatePool,
    },
    Drafting {
        resolution: AuctionResolution,
        draft: NormalDraft,
    },
}

/// Full auction session: bidding, then drafting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    sequence: Vec<String>,
    board: BTreeMap<usize, Holding>,
    statuses: Vec<PlayerAuctionStatus>,
    stage: Stage,
}

impl Auction {
    pub fn new(sequence: &TurnSequence, pool: CandidatePool) -> Self {
        Auction {
            sequence: sequence.players().to_vec(),
            board: BTreeMap::new(),
            statuses: vec![PlayerAuctionStatus::Bidding; sequence.len()],
            stage: Stage::Bidding {
                turn_index: 0,
                pool,
            },
        }
    }

    /// Number of slots, equal to the player count.
    pub fn slot_count(&self) -> usize {
        self.sequence.len()
    }

    pub fn board(&self) -> &BTreeMap<usize, Holding> {
        &self.board
    }

    /// Status of every player, in seating order.
    pub fn statuses(&self) -> Vec<(&str, PlayerAuctionStatus)> {
        self.sequence
            .iter()
            .map(String::as_str)
            .zip(self.statuses.iter().copied())
            .collect()
    }

    pub fn status_of(&self, player: &str) -> Option<PlayerAuctionStatus> {
        let seat = self.sequence.iter().position(|p| p == player)?;
        self.statuses.get(seat).copied()
    }

    pub fn is_bidding(&self) -> bool {
        matches!(self.stage, Stage::Bidding { .. })
    }

    /// The player to bid, or `None` once bidding is over.
    pub fn current_bidder(&self) -> Option<&str> {
        match &self.stage {
            Stage::Bidding { turn_index, .. } => self.sequence.get(*turn_index).map(String::as_str),
            Stage::Drafting { .. } => None,
        }
    }

    /// The untouched candidate pool while bidding; the draft's pool after.
    pub fn pool(&self) -> &CandidatePool {
        match &self.stage {
            Stage::Bidding { pool, .. } => pool,
            Stage::Drafting { draft, .. } => draft.pool(),
        }
    }

    pub fn resolution(&self) -> Option<&AuctionResolution> {
        match &self.stage {
            Stage::Drafting { resolution, .. } => Some(resolution),
            Stage::Bidding { .. } => None,
        }
    }

    pub fn draft(&self) -> Option<&NormalDraft> {
        match &self.stage {
            Stage::Drafting { draft, .. } => Some(draft),
            Stage::Bidding { .. } => None,
        }
    }

    /// Mutable access to the post-auction draft.
    pub fn draft_mut(&mut self) -> Result<&mut NormalDraft, SelectionError> {
        match &mut self.stage {
            Stage::Drafting { draft, .. } => Ok(draft),
            Stage::Bidding { .. } => Err(SelectionError::WrongPhase {
                phase: "bidding for turn order",
            }),
        }
    }

    /// Both bidding and drafting are finished.
    pub fn is_complete(&self) -> bool {
        self.draft().is_some_and(NormalDraft::is_complete)
    }

    /// The current bidder bids `bid` points on `slot`.
    ///
    /// Rejected without any state change when the slot is held by another
    /// player at exactly `bid`, or by anyone at more than `bid`.
    pub fn place_bid(&mut self, slot: usize, bid: u8) -> Result<BidOutcome, SelectionError> {
        let turn_index = self.bidding_turn()?;
        let n = self.slot_count();
        if slot == 0 || slot > n {
            return Err(SelectionError::SlotOutOfRange { slot, max: n });
        }
        if bid > MAX_BID {
            return Err(SelectionError::BidOutOfRange { bid, max: MAX_BID });
        }

        let player = self.sequence[turn_index].clone();
        if let Some(holding) = self.board.get(&slot) {
            if holding.player != player && holding.bid == bid {
                return Err(SelectionError::ExactBidTaken {
                    slot,
                    bid,
                    holder: holding.player.clone(),
                });
            }
            if holding.bid > bid {
                return Err(SelectionError::BidBelowHolder {
                    slot,
                    bid,
                    holder: holding.player.clone(),
                    holder_bid: holding.bid,
                });
            }
        }

        let mut displaced = None;
        if let Some(previous) = self.board.remove(&slot) {
            if previous.player != player {
                if let Some(seat) = self.seat_of(&previous.player) {
                    self.statuses[seat] = PlayerAuctionStatus::Displaced;
                }
                displaced = Some(previous.player);
            }
        }
        if let PlayerAuctionStatus::Placed { slot: old_slot, .. } = self.statuses[turn_index] {
            self.board.remove(&old_slot);
        }
        self.board.insert(
            slot,
            Holding {
                player: player.clone(),
                bid,
            },
        );
        self.statuses[turn_index] = PlayerAuctionStatus::Placed { slot, bid };
        debug!("{} bids {} on slot {}", player, bid, slot);
        if let Some(q) = &displaced {
            debug!("{} displaced from slot {}", q, slot);
        }

        if self.all_placed() {
            self.resolve();
            return Ok(BidOutcome {
                player,
                slot,
                bid,
                displaced,
                skipped: None,
                resolved: true,
            });
        }

        let skipped = self.advance(turn_index);
        Ok(BidOutcome {
            player,
            slot,
            bid,
            displaced,
            skipped,
            resolved: false,
        })
    }

    /// The current bidder keeps their slot and passes the turn. Only a
    /// player currently holding a slot may pass. Returns the player whose
    /// turn was then skipped, if any.
    pub fn pass(&mut self) -> Result<Option<String>, SelectionError> {
        let turn_index = self.bidding_turn()?;
        match self.statuses[turn_index] {
            PlayerAuctionStatus::Placed { .. } => {}
            PlayerAuctionStatus::Bidding | PlayerAuctionStatus::Displaced => {
                return Err(SelectionError::PassNotAllowed {
                    player: self.sequence[turn_index].clone(),
                });
            }
        }
        debug!("{} passes", self.sequence[turn_index]);
        Ok(self.advance(turn_index))
    }

    fn bidding_turn(&self) -> Result<usize, SelectionError> {
        match &self.stage {
            Stage::Bidding { turn_index, .. } => Ok(*turn_index),
            Stage::Drafting { draft, .. } if draft.is_complete() => Err(SelectionError::DraftComplete),
            Stage::Drafting { .. } => Err(SelectionError::WrongPhase {
                phase: "drafting factions and contracts",
            }),
        }
    }

    fn seat_of(&self, player: &str) -> Option<usize> {
        self.sequence.iter().position(|p| p == player)
    }

    fn all_placed(&self) -> bool {
        self.statuses
            .iter()
            .all(|s| matches!(s, PlayerAuctionStatus::Placed { .. }))
    }

    /// Move the pointer on from `from`, skipping the next player once if they
    /// hold the highest-numbered held slot.
    fn advance(&mut self, from: usize) -> Option<String> {
        let n = self.sequence.len();
        let mut next = (from + 1) % n;
        let mut skipped = None;
        if self.holds_max_slot(next) {
            skipped = Some(self.sequence[next].clone());
            debug!("skipping {}: holds the last held slot", self.sequence[next]);
            next = (next + 1) % n;
        }
        if let Stage::Bidding { turn_index, .. } = &mut self.stage {
            *turn_index = next;
        }
        skipped
    }

    fn holds_max_slot(&self, seat: usize) -> bool {
        let Some((_, holding)) = self.board.iter().next_back() else {
            return false;
        };
        holding.player == self.sequence[seat]
    }

    fn resolve(&mut self) {
        let final_turn_order: Vec<String> = self.board.values().map(|h| h.player.clone()).collect();
        let draft_order: Vec<String> = final_turn_order.iter().rev().cloned().collect();
        let bids: HashMap<String, u8> = self
            .board
            .values()
            .map(|h| (h.player.clone(), h.bid))
            .collect();

        let pool = match &mut self.stage {
            Stage::Bidding { pool, .. } => std::mem::take(pool),
            Stage::Drafting { .. } => return,
        };
        info!("auction resolved: turn order {:?}", final_turn_order);

        let draft = NormalDraft::with_bids(draft_order.clone(), pool, bids.clone());
        self.stage = Stage::Drafting {
            resolution: AuctionResolution {
                final_turn_order,
                draft_order,
                bids,
            },
            draft,
        };
    }
}
