// Application state and orchestration logic.
//
// One task owns the session and applies user commands one at a time. Each
// command produces a fresh snapshot for the TUI; a rejected command leaves
// the state as it was and is reported as `UiUpdate::Error`.

use std::collections::HashMap;
use std::path::Path;

use barrage_core::catalog::{Catalog, CatalogError};
use barrage_core::config::Config;
use barrage_core::store::RecordStore;
use barrage_draft::auction::BidOutcome;
use barrage_draft::players::TurnSequence;
use barrage_draft::sampler::{sample_pool, PoolRequest};
use barrage_draft::session::{EventOutcome, SessionEvent, SessionPhase, SessionState};
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::protocol::{AppSnapshot, Screen, ScoringTarget, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    store: Box<dyn RecordStore>,
    rng: StdRng,
    pub session: Option<SessionState>,
    /// Store id of the current session once appended.
    pub saved_session_id: Option<i64>,
    pub scoring: Option<ScoringTarget>,
    pub setup_error: Option<String>,
}

impl AppState {
    /// Create an AppState with no session yet. Call `start_new_session` (and
    /// optionally `recover_unscored`) before running the event loop.
    pub fn new(config: Config, catalog: Catalog, store: Box<dyn RecordStore>, rng: StdRng) -> Self {
        AppState {
            config,
            catalog,
            store,
            rng,
            session: None,
            saved_session_id: None,
            scoring: None,
            setup_error: None,
        }
    }

    /// Discard any session in progress and sample a new one: shuffle the
    /// players, weight the catalogs by recent usage, and draw the pool.
    pub fn start_new_session(&mut self) -> Result<(), AppError> {
        self.session = None;
        self.saved_session_id = None;
        self.setup_error = None;
        match self.sample_session() {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!("could not start a session: {}", e);
                self.setup_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn sample_session(&mut self) -> Result<SessionState, AppError> {
        let sequence = TurnSequence::shuffled(&self.config.session.players, &mut self.rng)?;
        let usage = self
            .store
            .recent_usage_counts(self.config.history_window)
            .map_err(AppError::persistence)?;
        let factions = self.catalog.selected_factions(&self.config.catalog_filter);
        let roles = self.catalog.selected_roles(&self.config.catalog_filter);

        let request = PoolRequest {
            factions: &factions,
            roles: &roles,
            contracts: &self.catalog.contracts,
            usage: &usage,
            player_count: sequence.len(),
            extra: self.config.session.extra_candidates,
        };
        let pool = sample_pool(&request, &mut self.rng)?;

        info!(
            "new session: turn sequence {:?}, {} pairs offered",
            sequence.players(),
            pool.pairs().len()
        );
        let mut session = SessionState::new(sequence, pool, self.config.session.board_variant.clone());
        if let Some(method) = self.config.session.default_method {
            session.apply(SessionEvent::ChooseMethod(method))?;
        }
        Ok(session)
    }

    /// Offer the latest unscored session for score entry. Returns `true` if
    /// one was found.
    pub fn recover_unscored(&mut self) -> anyhow::Result<bool> {
        let Some(snapshot) = self.store.find_unscored_session()? else {
            info!("No unscored session, starting fresh");
            return Ok(false);
        };
        info!(
            "Session {} from {} is waiting for scores",
            snapshot.id, snapshot.created_at
        );
        self.scoring = Some(ScoringTarget {
            session_id: snapshot.id,
            created_at: Some(snapshot.created_at),
            record: snapshot.record,
            entered: snapshot.final_scores,
        });
        Ok(true)
    }

    /// Apply one command. Returns a notice to show on success.
    pub fn handle_command(&mut self, cmd: UserCommand) -> Result<Option<String>, AppError> {
        match cmd {
            UserCommand::ChooseMethod(method) => {
                self.apply_event(SessionEvent::ChooseMethod(method))?;
                Ok(None)
            }
            UserCommand::TogglePair(id) => {
                self.apply_event(SessionEvent::TogglePair(id))?;
                Ok(None)
            }
            UserCommand::ToggleContract(id) => {
                self.apply_event(SessionEvent::ToggleContract(id))?;
                Ok(None)
            }
            UserCommand::ConfirmPick => match self.apply_event(SessionEvent::ConfirmPick)? {
                EventOutcome::PickConfirmed { complete: true, .. } => {
                    let id = self.save_session()?;
                    Ok(Some(format!("Allocation complete, saved as session {id}")))
                }
                EventOutcome::PickConfirmed { player, .. } => Ok(Some(format!("{player} confirmed"))),
                _ => Ok(None),
            },
            UserCommand::PlaceBid { slot, bid } => {
                match self.apply_event(SessionEvent::PlaceBid { slot, bid })? {
                    EventOutcome::BidPlaced(outcome) => Ok(Some(describe_bid(&outcome, self))),
                    _ => Ok(None),
                }
            }
            UserCommand::PassTurn => match self.apply_event(SessionEvent::PassTurn)? {
                EventOutcome::Passed { player, skipped } => {
                    let mut notice = format!("{player} passes");
                    if let Some(s) = skipped {
                        notice.push_str(&format!("; {s} holds the last slot and is skipped"));
                    }
                    Ok(Some(notice))
                }
                _ => Ok(None),
            },
            UserCommand::SaveSession => {
                let id = self.save_session()?;
                Ok(Some(format!("Saved as session {id}")))
            }
            UserCommand::OpenScoring => {
                self.open_scoring()?;
                Ok(None)
            }
            UserCommand::SubmitScores(scores) => self.submit_scores(scores).map(Some),
            UserCommand::SkipScoring => {
                if self.scoring.take().is_none() {
                    return Err(AppError::NothingToScore);
                }
                if self.current_session_finished() {
                    self.start_new_session()?;
                }
                Ok(None)
            }
            UserCommand::Reset => {
                self.scoring = None;
                self.start_new_session()?;
                Ok(Some("New session sampled".to_string()))
            }
            // Handled in the event loop.
            UserCommand::Quit => Ok(None),
        }
    }

    fn apply_event(&mut self, event: SessionEvent) -> Result<EventOutcome, AppError> {
        let session = self.session.as_mut().ok_or(AppError::NoSession)?;
        Ok(session.apply(event)?)
    }

    /// Append the finished allocation to the record store. Idempotent once
    /// it has succeeded; a failure leaves the session untouched for a retry.
    pub fn save_session(&mut self) -> Result<i64, AppError> {
        if let Some(id) = self.saved_session_id {
            return Ok(id);
        }
        let session = self.session.as_ref().ok_or(AppError::NoSession)?;
        let record = session.record()?;
        let id = self
            .store
            .append_session(&record)
            .map_err(AppError::persistence)?;
        self.saved_session_id = Some(id);
        info!("Session saved with id {}", id);
        Ok(id)
    }

    fn open_scoring(&mut self) -> Result<(), AppError> {
        let id = self.save_session()?;
        let session = self.session.as_ref().ok_or(AppError::NoSession)?;
        self.scoring = Some(ScoringTarget {
            session_id: id,
            created_at: None,
            record: session.record()?,
            entered: HashMap::new(),
        });
        Ok(())
    }

    fn submit_scores(&mut self, scores: HashMap<String, i32>) -> Result<String, AppError> {
        let session_id = self
            .scoring
            .as_ref()
            .map(|t| t.session_id)
            .ok_or(AppError::NothingToScore)?;
        let accepted = self
            .store
            .apply_final_scores(session_id, &scores)
            .map_err(AppError::persistence)?;
        if !accepted {
            return Err(AppError::ScoresRejected { session_id });
        }
        info!("Final scores stored for session {}", session_id);
        self.scoring = None;

        if self.current_session_finished() {
            if let Err(e) = self.start_new_session() {
                warn!("scores saved but no new session could be sampled: {}", e);
            }
        }
        Ok(format!("Scores saved for session {session_id}"))
    }

    fn current_session_finished(&self) -> bool {
        match &self.session {
            None => true,
            Some(s) => s.is_complete() && self.saved_session_id.is_some(),
        }
    }

    pub fn screen(&self) -> Screen {
        if self.scoring.is_some() {
            return Screen::Scoring;
        }
        match self.session.as_ref().map(SessionState::phase) {
            None | Some(SessionPhase::ChoosingMethod) => Screen::Setup,
            Some(SessionPhase::Bidding) | Some(SessionPhase::Drafting) => Screen::Allocation,
            Some(SessionPhase::Complete) => Screen::Results,
        }
    }

    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            screen: self.screen(),
            players: self.config.session.players.clone(),
            extra_candidates: self.config.session.extra_candidates,
            board_variant: self.config.session.board_variant.clone(),
            session: self.session.as_ref().map(SessionState::view),
            record: self.session.as_ref().and_then(|s| s.record().ok()),
            saved_session_id: self.saved_session_id,
            scoring: self.scoring.clone(),
            setup_error: self.setup_error.clone(),
        }
    }
}

fn describe_bid(outcome: &BidOutcome, state: &AppState) -> String {
    let mut notice = format!(
        "{} bids {} on slot {}",
        outcome.player, outcome.bid, outcome.slot
    );
    if let Some(d) = &outcome.displaced {
        notice.push_str(&format!("; {d} is displaced"));
    }
    if let Some(s) = &outcome.skipped {
        notice.push_str(&format!("; {s} holds the last slot and is skipped"));
    }
    if outcome.resolved {
        let order = state
            .session
            .as_ref()
            .map(|s| s.view().draft_order)
            .unwrap_or_default();
        notice.push_str(&format!("; bidding over, draft order: {}", order.join(", ")));
    }
    notice
}

/// Load the catalogs as they stand today.
pub fn load_catalog_for_today(base_dir: &Path, config: &Config) -> Result<Catalog, CatalogError> {
    let today = chrono::Local::now().date_naive();
    Catalog::load(base_dir, &config.data_paths, today)
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the application event loop until the TUI quits or goes away.
///
/// Sends an initial snapshot, then one snapshot after every command.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.build_snapshot())))
        .await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = ui_tx.closed() => {
                info!("UI channel closed, shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    debug!("user command: {:?}", cmd);
    match state.handle_command(cmd) {
        Ok(Some(notice)) => {
            let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
        }
        Ok(None) => {}
        Err(e) => {
            warn!("command rejected: {}", e);
            let _ = ui_tx.send(UiUpdate::Error(e.to_string())).await;
        }
    }
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
