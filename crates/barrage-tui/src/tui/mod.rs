// TUI: view state, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the latest `AppSnapshot` plus local
// cursors and text buffers. The app task pushes `UiUpdate` messages over an
// mpsc channel; the TUI applies them and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use barrage_app::protocol::{AppSnapshot, Screen, UiUpdate, UserCommand};
use barrage_core::record::SessionRecord;
use barrage_draft::session::{SessionPhase, SessionView};
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Which candidate list the cursor keys move in while drafting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Pairs,
    Contracts,
}

/// One-line message shown in the status bar until the next command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Notice(String),
    Error(String),
}

/// TUI-local state: the last snapshot from the app plus everything the user
/// is composing before it becomes a command.
#[derive(Debug, Default)]
pub struct ViewState {
    pub snapshot: Option<AppSnapshot>,
    pub focus: Focus,
    pub pair_cursor: usize,
    pub contract_cursor: usize,
    /// Auction slot and bid being composed. Slot 0 until a board arrives.
    pub bid_slot: usize,
    pub bid_value: u8,
    /// Score entry rows, one per player of the session being scored.
    pub score_session: Option<i64>,
    pub score_players: Vec<String>,
    pub score_inputs: Vec<String>,
    pub score_cursor: usize,
    pub banner: Option<Banner>,
    pub confirm_quit: bool,
    pub confirm_reset: bool,
}

impl ViewState {
    pub fn screen(&self) -> Screen {
        self.snapshot
            .as_ref()
            .map(|s| s.screen)
            .unwrap_or(Screen::Setup)
    }

    pub fn session(&self) -> Option<&SessionView> {
        self.snapshot.as_ref().and_then(|s| s.session.as_ref())
    }

    pub fn phase(&self) -> Option<SessionPhase> {
        self.session().map(|s| s.phase)
    }

    /// The record on screen: the finished allocation, or the session being
    /// scored.
    pub fn record(&self) -> Option<&SessionRecord> {
        let snapshot = self.snapshot.as_ref()?;
        match &snapshot.scoring {
            Some(target) => Some(&target.record),
            None => snapshot.record.as_ref(),
        }
    }

    /// Apply a full snapshot, keeping cursors inside the new lists.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        if let Some(view) = &snapshot.session {
            self.pair_cursor = clamp_cursor(self.pair_cursor, view.pairs.len());
            self.contract_cursor = clamp_cursor(self.contract_cursor, view.contracts.len());
            if !view.board.is_empty() {
                self.bid_slot = self.bid_slot.clamp(1, view.board.len());
            }
        }

        match &snapshot.scoring {
            Some(target) if self.score_session != Some(target.session_id) => {
                self.score_session = Some(target.session_id);
                self.score_players = target.record.turn_sequence.clone();
                self.score_inputs = self
                    .score_players
                    .iter()
                    .map(|p| target.entered.get(p).map(|v| v.to_string()).unwrap_or_default())
                    .collect();
                self.score_cursor = 0;
            }
            Some(_) => {}
            None => {
                self.score_session = None;
                self.score_players.clear();
                self.score_inputs.clear();
                self.score_cursor = 0;
            }
        }

        self.snapshot = Some(snapshot);
    }

    /// Scores typed so far, or the name of the first player whose entry is
    /// missing or not a number.
    pub fn parsed_scores(&self) -> Result<HashMap<String, i32>, String> {
        let mut scores = HashMap::new();
        for (player, input) in self.score_players.iter().zip(&self.score_inputs) {
            let value = input.trim().parse::<i32>().map_err(|_| player.clone())?;
            scores.insert(player.clone(), value);
        }
        Ok(scores)
    }
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
        UiUpdate::Notice(text) => state.banner = Some(Banner::Notice(text)),
        UiUpdate::Error(text) => state.banner = Some(Banner::Error(text)),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::turn_banner::render(frame, layout.banner, state);

    match state.screen() {
        Screen::Setup => {
            widgets::candidates::render(frame, layout.main_panel, state, false);
            widgets::picks::render(frame, layout.sidebar, state);
        }
        Screen::Allocation if state.phase() == Some(SessionPhase::Bidding) => {
            widgets::auction_board::render(frame, layout.main_panel, state);
            widgets::candidates::render(frame, layout.sidebar, state, false);
        }
        Screen::Allocation => {
            widgets::candidates::render(frame, layout.main_panel, state, true);
            widgets::picks::render(frame, layout.sidebar, state);
        }
        Screen::Results => {
            widgets::results::render(frame, layout.main_panel, state);
            widgets::picks::render(frame, layout.sidebar, state);
        }
        Screen::Scoring => {
            widgets::scoring::render(frame, layout.main_panel, state);
            widgets::results::render(frame, layout.sidebar, state);
        }
    }

    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::confirm::render(frame, frame.area(), " Quit? ", "Really quit?");
    } else if state.confirm_reset {
        widgets::confirm::render(frame, frame.area(), " Reset? ", "Resample session?");
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App task is gone
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            debug!("sending command {:?}", cmd);
                            let quit = cmd == UserCommand::Quit;
                            view_state.banner = None;
                            if cmd_tx.send(cmd).await.is_err() || quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
