// Normal draft: each player in turn takes one pair and one contract.

use std::collections::HashMap;

use barrage_core::catalog::CatalogItem;
use barrage_core::record::BASE_STARTING_SCORE;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SelectionError;
use crate::pool::{CandidatePair, CandidatePool};

/// Where the draft stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftPhase {
    /// `order[turn_index]` is choosing.
    AwaitingPick { turn_index: usize },
    Complete,
}

/// The current player's in-progress choice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub pair: Option<String>,
    pub contract: Option<String>,
}

impl Selection {
    pub fn is_complete(&self) -> bool {
        self.pair.is_some() && self.contract.is_some()
    }
}

/// A confirmed pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    pub player: String,
    pub pair: CandidatePair,
    pub contract: CatalogItem,
    /// Turn-order bid paid, for auction-driven drafts.
    pub bid: Option<u8>,
    pub starting_score: i32,
}

/// Sequential draft over a fixed pick order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalDraft {
    order: Vec<String>,
    pool: CandidatePool,
    phase: DraftPhase,
    selection: Selection,
    picks: Vec<DraftPick>,
    bids: HashMap<String, u8>,
}

impl NormalDraft {
    /// Start a draft where everyone begins on the base starting score.
    pub fn new(order: Vec<String>, pool: CandidatePool) -> Self {
        Self::with_bids(order, pool, HashMap::new())
    }

    /// Start a draft where each player's starting score is reduced by the
    /// bid they paid in the turn-order auction.
    pub fn with_bids(order: Vec<String>, pool: CandidatePool, bids: HashMap<String, u8>) -> Self {
        let phase = if order.is_empty() {
            DraftPhase::Complete
        } else {
            DraftPhase::AwaitingPick { turn_index: 0 }
        };
        NormalDraft {
            order,
            pool,
            phase,
            selection: Selection::default(),
            picks: Vec::new(),
            bids,
        }
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn is_complete(&self) -> bool {
        self.phase == DraftPhase::Complete
    }

    /// The player whose turn it is, or `None` once complete.
    pub fn current_player(&self) -> Option<&str> {
        match self.phase {
            DraftPhase::AwaitingPick { turn_index } => self.order.get(turn_index).map(String::as_str),
            DraftPhase::Complete => None,
        }
    }

    /// Select the pair `id`, or clear it if it is already selected.
    pub fn toggle_pair(&mut self, id: &str) -> Result<(), SelectionError> {
        self.ensure_open()?;
        if self.pool.pair(id).is_none() {
            return Err(SelectionError::UnknownCandidate { id: id.to_string() });
        }
        toggle(&mut self.selection.pair, id);
        Ok(())
    }

    /// Select the contract `id`, or clear it if it is already selected.
    pub fn toggle_contract(&mut self, id: &str) -> Result<(), SelectionError> {
        self.ensure_open()?;
        if self.pool.contract(id).is_none() {
            return Err(SelectionError::UnknownCandidate { id: id.to_string() });
        }
        toggle(&mut self.selection.contract, id);
        Ok(())
    }

    /// Lock in the current selection for the current player and advance.
    pub fn confirm(&mut self) -> Result<&DraftPick, SelectionError> {
        let turn_index = match self.phase {
            DraftPhase::AwaitingPick { turn_index } => turn_index,
            DraftPhase::Complete => return Err(SelectionError::DraftComplete),
        };
        let (Some(pair_id), Some(contract_id)) =
            (self.selection.pair.clone(), self.selection.contract.clone())
        else {
            return Err(SelectionError::IncompleteSelection);
        };
        if self.pool.pair(&pair_id).is_none() {
            return Err(SelectionError::UnknownCandidate { id: pair_id });
        }
        if self.pool.contract(&contract_id).is_none() {
            return Err(SelectionError::UnknownCandidate { id: contract_id });
        }
        let (Some(pair), Some(contract)) = (
            self.pool.take_pair(&pair_id),
            self.pool.take_contract(&contract_id),
        ) else {
            return Err(SelectionError::IncompleteSelection);
        };

        let player = self.order[turn_index].clone();
        let bid = self.bids.get(&player).copied();
        let starting_score = BASE_STARTING_SCORE - bid.map(i32::from).unwrap_or(0);
        debug!("{} picks {} with {}", player, pair.label(), contract.name);

        self.picks.push(DraftPick {
            player,
            pair,
            contract,
            bid,
            starting_score,
        });
        self.selection = Selection::default();
        self.phase = if turn_index + 1 >= self.order.len() {
            DraftPhase::Complete
        } else {
            DraftPhase::AwaitingPick {
                turn_index: turn_index + 1,
            }
        };

        let last = self.picks.len() - 1;
        Ok(&self.picks[last])
    }

    fn ensure_open(&self) -> Result<(), SelectionError> {
        if self.is_complete() {
            Err(SelectionError::DraftComplete)
        } else {
            Ok(())
        }
    }
}

fn toggle(slot: &mut Option<String>, id: &str) {
    if slot.as_deref() == Some(id) {
        *slot = None;
    } else {
        *slot = Some(id.to_string());
    }
}
