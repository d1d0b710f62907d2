// Turns a finished draft or auction into the record handed to the store.

use barrage_core::record::{DraftMethod, DraftResult, SessionRecord};

use crate::auction::Auction;
use crate::draft::{DraftPick, NormalDraft};
use crate::error::SelectionError;
use crate::players::TurnSequence;

/// Record for a completed normal draft. The first round is played in the
/// reverse of the seating order.
pub fn assemble_normal(
    sequence: &TurnSequence,
    draft: &NormalDraft,
    board_variant: &str,
) -> Result<SessionRecord, SelectionError> {
    if !draft.is_complete() {
        return Err(SelectionError::NotComplete);
    }
    Ok(build(
        sequence,
        draft.picks(),
        sequence.reversed(),
        DraftMethod::Normal,
        board_variant,
    ))
}

/// Record for a completed auction. The first round follows the slots won.
pub fn assemble_auction(
    sequence: &TurnSequence,
    auction: &Auction,
    board_variant: &str,
) -> Result<SessionRecord, SelectionError> {
    let (Some(resolution), Some(draft)) = (auction.resolution(), auction.draft()) else {
        return Err(SelectionError::NotComplete);
    };
    if !draft.is_complete() {
        return Err(SelectionError::NotComplete);
    }
    Ok(build(
        sequence,
        draft.picks(),
        resolution.final_turn_order.clone(),
        DraftMethod::Auction,
        board_variant,
    ))
}

fn build(
    sequence: &TurnSequence,
    picks: &[DraftPick],
    first_round_order: Vec<String>,
    method: DraftMethod,
    board_variant: &str,
) -> SessionRecord {
    let results = sequence
        .players()
        .iter()
        .filter_map(|player| picks.iter().find(|p| &p.player == player))
        .map(|pick| DraftResult {
            player: pick.player.clone(),
            faction: pick.pair.faction.name.clone(),
            role: pick.pair.role.name.clone(),
            contract: pick.contract.name.clone(),
            bid: pick.bid,
            starting_score: pick.starting_score,
        })
        .collect();

    SessionRecord {
        player_count: sequence.len(),
        turn_sequence: sequence.players().to_vec(),
        results,
        first_round_order,
        method,
        board_variant: board_variant.to_string(),
    }
}
