// Session state: one in-progress allocation, driven by explicit events.

use barrage_core::catalog::CatalogItem;
use barrage_core::record::{DraftMethod, SessionRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auction::{Auction, BidOutcome, Holding, PlayerAuctionStatus};
use crate::draft::{DraftPick, NormalDraft, Selection};
use crate::error::SelectionError;
use crate::players::TurnSequence;
use crate::pool::{CandidatePair, CandidatePool};
use crate::result;

/// The allocation method in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Allocation {
    Normal(NormalDraft),
    Auction(Auction),
}

/// A single user action against the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    ChooseMethod(DraftMethod),
    TogglePair(String),
    ToggleContract(String),
    ConfirmPick,
    PlaceBid { slot: usize, bid: u8 },
    PassTurn,
}

/// What an accepted event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    MethodChosen(DraftMethod),
    SelectionChanged,
    PickConfirmed { player: String, complete: bool },
    BidPlaced(BidOutcome),
    Passed { player: String, skipped: Option<String> },
}

/// Coarse phase, for choosing which screen to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    ChoosingMethod,
    Bidding,
    Drafting,
    Complete,
}

impl SessionPhase {
    fn label(self) -> &'static str {
        match self {
            SessionPhase::ChoosingMethod => "choosing a method",
            SessionPhase::Bidding => "bidding for turn order",
            SessionPhase::Drafting => "drafting factions and contracts",
            SessionPhase::Complete => "the allocation is complete",
        }
    }
}

/// Read-only picture of the session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub method: Option<DraftMethod>,
    pub turn_sequence: Vec<String>,
    /// Player to act, in either phase.
    pub current_player: Option<String>,
    pub pairs: Vec<CandidatePair>,
    pub contracts: Vec<CatalogItem>,
    pub selection: Selection,
    /// Every slot 1..=N with its holder, auction only.
    pub board: Vec<(usize, Option<Holding>)>,
    /// Auction standing per player in seating order, auction only.
    pub statuses: Vec<(String, PlayerAuctionStatus)>,
    /// Draft pick order once known.
    pub draft_order: Vec<String>,
    pub picks: Vec<DraftPick>,
}

/// One session: the fixed turn sequence, then either the sampled pool
/// waiting for a method or the allocation in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    sequence: TurnSequence,
    board_variant: String,
    pool: Option<CandidatePool>,
    allocation: Option<Allocation>,
}

impl SessionState {
    pub fn new(sequence: TurnSequence, pool: CandidatePool, board_variant: impl Into<String>) -> Self {
        SessionState {
            sequence,
            board_variant: board_variant.into(),
            pool: Some(pool),
            allocation: None,
        }
    }

    pub fn sequence(&self) -> &TurnSequence {
        &self.sequence
    }

    pub fn allocation(&self) -> Option<&Allocation> {
        self.allocation.as_ref()
    }

    pub fn method(&self) -> Option<DraftMethod> {
        match &self.allocation {
            Some(Allocation::Normal(_)) => Some(DraftMethod::Normal),
            Some(Allocation::Auction(_)) => Some(DraftMethod::Auction),
            None => None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.allocation {
            None => SessionPhase::ChoosingMethod,
            Some(Allocation::Normal(d)) if d.is_complete() => SessionPhase::Complete,
            Some(Allocation::Normal(_)) => SessionPhase::Drafting,
            Some(Allocation::Auction(a)) if a.is_complete() => SessionPhase::Complete,
            Some(Allocation::Auction(a)) if a.is_bidding() => SessionPhase::Bidding,
            Some(Allocation::Auction(_)) => SessionPhase::Drafting,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == SessionPhase::Complete
    }

    /// Apply one event. On error the state is unchanged.
    pub fn apply(&mut self, event: SessionEvent) -> Result<EventOutcome, SelectionError> {
        let outcome = match event {
            SessionEvent::ChooseMethod(method) => self.choose_method(method),
            SessionEvent::TogglePair(id) => self
                .draft_mut()
                .and_then(|d| d.toggle_pair(&id))
                .map(|_| EventOutcome::SelectionChanged),
            SessionEvent::ToggleContract(id) => self
                .draft_mut()
                .and_then(|d| d.toggle_contract(&id))
                .map(|_| EventOutcome::SelectionChanged),
            SessionEvent::ConfirmPick => self.draft_mut().and_then(|d| {
                let player = d.confirm()?.player.clone();
                Ok(EventOutcome::PickConfirmed {
                    player,
                    complete: d.is_complete(),
                })
            }),
            SessionEvent::PlaceBid { slot, bid } => self
                .auction_mut()
                .and_then(|a| a.place_bid(slot, bid))
                .map(EventOutcome::BidPlaced),
            SessionEvent::PassTurn => self.auction_mut().and_then(|a| {
                let player = a.current_bidder().unwrap_or_default().to_string();
                let skipped = a.pass()?;
                Ok(EventOutcome::Passed { player, skipped })
            }),
        };

        match &outcome {
            Ok(o) => debug!("session event applied: {:?}", o),
            Err(e) => warn!("session event rejected: {}", e),
        }
        if self.is_complete() && matches!(outcome, Ok(EventOutcome::PickConfirmed { complete: true, .. })) {
            info!("allocation complete ({} players)", self.sequence.len());
        }
        outcome
    }

    /// The finished record, or `NotComplete`.
    pub fn record(&self) -> Result<SessionRecord, SelectionError> {
        match &self.allocation {
            Some(Allocation::Normal(draft)) => {
                result::assemble_normal(&self.sequence, draft, &self.board_variant)
            }
            Some(Allocation::Auction(auction)) => {
                result::assemble_auction(&self.sequence, auction, &self.board_variant)
            }
            None => Err(SelectionError::NotComplete),
        }
    }

    pub fn view(&self) -> SessionView {
        let phase = self.phase();
        let mut view = SessionView {
            phase,
            method: self.method(),
            turn_sequence: self.sequence.players().to_vec(),
            current_player: None,
            pairs: Vec::new(),
            contracts: Vec::new(),
            selection: Selection::default(),
            board: Vec::new(),
            statuses: Vec::new(),
            draft_order: Vec::new(),
            picks: Vec::new(),
        };

        let draft = match &self.allocation {
            None => {
                if let Some(pool) = &self.pool {
                    fill_pool(&mut view, pool);
                }
                None
            }
            Some(Allocation::Normal(draft)) => Some(draft),
            Some(Allocation::Auction(auction)) => {
                view.board = (1..=auction.slot_count())
                    .map(|slot| (slot, auction.board().get(&slot).cloned()))
                    .collect();
                view.statuses = auction
                    .statuses()
                    .into_iter()
                    .map(|(p, s)| (p.to_string(), s))
                    .collect();
                if auction.is_bidding() {
                    fill_pool(&mut view, auction.pool());
                    view.current_player = auction.current_bidder().map(str::to_string);
                }
                auction.draft()
            }
        };

        if let Some(draft) = draft {
            fill_pool(&mut view, draft.pool());
            view.current_player = draft.current_player().map(str::to_string);
            view.selection = draft.selection().clone();
            view.draft_order = draft.order().to_vec();
            view.picks = draft.picks().to_vec();
        }
        view
    }

    fn choose_method(&mut self, method: DraftMethod) -> Result<EventOutcome, SelectionError> {
        if self.allocation.is_some() {
            return Err(SelectionError::WrongPhase {
                phase: self.phase().label(),
            });
        }
        let Some(pool) = self.pool.take() else {
            return Err(SelectionError::WrongPhase {
                phase: self.phase().label(),
            });
        };
        self.allocation = Some(match method {
            DraftMethod::Normal => Allocation::Normal(NormalDraft::new(self.sequence.players().to_vec(), pool)),
            DraftMethod::Auction => Allocation::Auction(Auction::new(&self.sequence, pool)),
        });
        info!("allocation method: {}", method);
        Ok(EventOutcome::MethodChosen(method))
    }

    fn draft_mut(&mut self) -> Result<&mut NormalDraft, SelectionError> {
        let phase = self.phase();
        match &mut self.allocation {
            Some(Allocation::Normal(draft)) => Ok(draft),
            Some(Allocation::Auction(auction)) => auction.draft_mut(),
            None => Err(SelectionError::WrongPhase { phase: phase.label() }),
        }
    }

    fn auction_mut(&mut self) -> Result<&mut Auction, SelectionError> {
        let phase = self.phase();
        match &mut self.allocation {
            Some(Allocation::Auction(auction)) => Ok(auction),
            Some(Allocation::Normal(_)) | None => Err(SelectionError::WrongPhase { phase: phase.label() }),
        }
    }
}

fn fill_pool(view: &mut SessionView, pool: &CandidatePool) {
    view.pairs = pool.pairs().to_vec();
    view.contracts = pool.contracts().to_vec();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> CandidatePool {
        let pairs = (1..=n)
            .map(|i| {
                CandidatePair::new(
                    CatalogItem::new(format!("F{i}"), format!("Faction {i}")),
                    CatalogItem::new(format!("E{i}"), format!("Exec {i}")),
                )
            })
            .collect();
        let contracts = (1..=n)
            .map(|i| CatalogItem::new(format!("K{i}"), format!("Contract {i}")))
            .collect();
        CandidatePool::new(pairs, contracts)
    }

    fn session(names: &[&str]) -> SessionState {
        let seq = TurnSequence::new(names.iter().copied()).unwrap();
        SessionState::new(seq, pool(names.len()), "standard")
    }

    fn pick(state: &mut SessionState, pair: &str, contract: &str) -> EventOutcome {
        state.apply(SessionEvent::TogglePair(pair.into())).unwrap();
        state.apply(SessionEvent::ToggleContract(contract.into())).unwrap();
        state.apply(SessionEvent::ConfirmPick).unwrap()
    }

    #[test]
    fn picks_are_rejected_before_a_method_is_chosen() {
        let mut s = session(&["Ann", "Bo"]);
        assert_eq!(s.phase(), SessionPhase::ChoosingMethod);
        let before = s.clone();
        assert!(matches!(
            s.apply(SessionEvent::TogglePair("F1+E1".into())),
            Err(SelectionError::WrongPhase { .. })
        ));
        assert!(matches!(
            s.apply(SessionEvent::PlaceBid { slot: 1, bid: 0 }),
            Err(SelectionError::WrongPhase { .. })
        ));
        assert_eq!(s, before);
        assert_eq!(s.view().pairs.len(), 2);
    }

    #[test]
    fn method_can_only_be_chosen_once() {
        let mut s = session(&["Ann"]);
        assert_eq!(
            s.apply(SessionEvent::ChooseMethod(DraftMethod::Normal)).unwrap(),
            EventOutcome::MethodChosen(DraftMethod::Normal)
        );
        assert!(matches!(
            s.apply(SessionEvent::ChooseMethod(DraftMethod::Auction)),
            Err(SelectionError::WrongPhase { .. })
        ));
        assert_eq!(s.method(), Some(DraftMethod::Normal));
    }

    #[test]
    fn normal_session_runs_to_a_record() {
        let mut s = session(&["Ann", "Bo"]);
        s.apply(SessionEvent::ChooseMethod(DraftMethod::Normal)).unwrap();
        assert_eq!(s.phase(), SessionPhase::Drafting);
        assert_eq!(s.view().current_player.as_deref(), Some("Ann"));
        assert!(matches!(
            s.apply(SessionEvent::PassTurn),
            Err(SelectionError::WrongPhase { .. })
        ));

        assert_eq!(
            pick(&mut s, "F1+E1", "K2"),
            EventOutcome::PickConfirmed { player: "Ann".into(), complete: false }
        );
        assert!(matches!(s.record(), Err(SelectionError::NotComplete)));
        assert_eq!(
            pick(&mut s, "F2+E2", "K1"),
            EventOutcome::PickConfirmed { player: "Bo".into(), complete: true }
        );
        assert!(s.is_complete());
        let view = s.view();
        assert!(view.pairs.is_empty() && view.contracts.is_empty());
        assert_eq!(view.picks.len(), 2);

        let record = s.record().unwrap();
        assert_eq!(record.first_round_order, vec!["Bo", "Ann"]);
        assert_eq!(record.results[1].contract, "Contract 1");
    }

    #[test]
    fn auction_session_bids_then_drafts() {
        let mut s = session(&["Ann", "Bo"]);
        s.apply(SessionEvent::ChooseMethod(DraftMethod::Auction)).unwrap();
        assert_eq!(s.phase(), SessionPhase::Bidding);
        assert!(matches!(
            s.apply(SessionEvent::ConfirmPick),
            Err(SelectionError::WrongPhase { .. })
        ));

        let view = s.view();
        assert_eq!(view.board, vec![(1, None), (2, None)]);
        assert_eq!(view.current_player.as_deref(), Some("Ann"));

        s.apply(SessionEvent::PlaceBid { slot: 1, bid: 2 }).unwrap();
        let out = s.apply(SessionEvent::PlaceBid { slot: 2, bid: 0 }).unwrap();
        assert!(matches!(out, EventOutcome::BidPlaced(BidOutcome { resolved: true, .. })));
        assert_eq!(s.phase(), SessionPhase::Drafting);

        let view = s.view();
        assert_eq!(view.draft_order, vec!["Bo", "Ann"]);
        assert_eq!(view.current_player.as_deref(), Some("Bo"));
        assert_eq!(view.board[0].1, Some(Holding { player: "Ann".into(), bid: 2 }));

        pick(&mut s, "F2+E2", "K2");
        pick(&mut s, "F1+E1", "K1");
        let record = s.record().unwrap();
        assert_eq!(record.method, DraftMethod::Auction);
        assert_eq!(record.first_round_order, vec!["Ann", "Bo"]);
        assert_eq!(record.result_for("Ann").unwrap().starting_score, 8);
    }

    #[test]
    fn pass_outcome_names_the_passer() {
        let mut s = session(&["Ann", "Bo", "Cy"]);
        s.apply(SessionEvent::ChooseMethod(DraftMethod::Auction)).unwrap();
        s.apply(SessionEvent::PlaceBid { slot: 1, bid: 0 }).unwrap(); // Ann -> 1
        s.apply(SessionEvent::PlaceBid { slot: 3, bid: 0 }).unwrap(); // Bo -> 3
        s.apply(SessionEvent::PlaceBid { slot: 3, bid: 1 }).unwrap(); // Cy displaces Bo
        assert_eq!(
            s.apply(SessionEvent::PassTurn).unwrap(),
            EventOutcome::Passed { player: "Ann".into(), skipped: None }
        );
        assert_eq!(s.view().current_player.as_deref(), Some("Bo"));
    }

    #[test]
    fn rejected_bid_leaves_session_unchanged() {
        let mut s = session(&["Ann", "Bo"]);
        s.apply(SessionEvent::ChooseMethod(DraftMethod::Auction)).unwrap();
        s.apply(SessionEvent::PlaceBid { slot: 1, bid: 5 }).unwrap();
        let before = s.clone();
        assert!(s.apply(SessionEvent::PlaceBid { slot: 1, bid: 5 }).is_err());
        assert!(s.apply(SessionEvent::PlaceBid { slot: 1, bid: 4 }).is_err());
        assert_eq!(s, before);
    }
}
