// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// task, or into local ViewState changes (cursors, bid composition, score
// typing, confirmation dialogs).

use barrage_app::protocol::{Screen, UserCommand};
use barrage_core::record::DraftMethod;
use barrage_draft::auction::MAX_BID;
use barrage_draft::session::SessionPhase;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Banner, Focus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should go to the app task.
/// Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports Release events on some platforms
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }
    if view_state.confirm_reset {
        return handle_confirm_reset(key_event, view_state);
    }

    // Score entry captures digits, so it gets the keyboard before the
    // global shortcuts.
    if view_state.screen() == Screen::Scoring {
        return handle_scoring(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Char('R') => {
            view_state.confirm_reset = true;
            None
        }
        _ => match view_state.screen() {
            Screen::Setup => handle_setup(key_event, view_state),
            Screen::Allocation if view_state.phase() == Some(SessionPhase::Bidding) => {
                handle_bidding(key_event, view_state)
            }
            Screen::Allocation => handle_drafting(key_event, view_state),
            Screen::Results => handle_results(key_event, view_state),
            Screen::Scoring => None,
        },
    }
}

fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

fn handle_confirm_reset(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm_reset = false;
            Some(UserCommand::Reset)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_reset = false;
            None
        }
        _ => None,
    }
}

fn handle_setup(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.session().is_none() {
        // Sampling failed; let the user retry after fixing the data.
        return match key_event.code {
            KeyCode::Enter | KeyCode::Char('r') => Some(UserCommand::Reset),
            _ => None,
        };
    }
    match key_event.code {
        KeyCode::Char('n') | KeyCode::Char('N') => Some(UserCommand::ChooseMethod(DraftMethod::Normal)),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(UserCommand::ChooseMethod(DraftMethod::Auction)),
        _ => None,
    }
}

fn handle_drafting(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let (pair_count, contract_count) = view_state
        .session()
        .map(|s| (s.pairs.len(), s.contracts.len()))
        .unwrap_or((0, 0));

    match key_event.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            view_state.focus = match view_state.focus {
                Focus::Pairs => Focus::Contracts,
                Focus::Contracts => Focus::Pairs,
            };
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let cursor = focused_cursor(view_state);
            *cursor = cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = match view_state.focus {
                Focus::Pairs => pair_count,
                Focus::Contracts => contract_count,
            };
            let cursor = focused_cursor(view_state);
            if *cursor + 1 < len {
                *cursor += 1;
            }
            None
        }
        KeyCode::Char(' ') => {
            let session = view_state.session()?;
            match view_state.focus {
                Focus::Pairs => session
                    .pairs
                    .get(view_state.pair_cursor)
                    .map(|p| UserCommand::TogglePair(p.id.clone())),
                Focus::Contracts => session
                    .contracts
                    .get(view_state.contract_cursor)
                    .map(|c| UserCommand::ToggleContract(c.id.clone())),
            }
        }
        KeyCode::Enter => Some(UserCommand::ConfirmPick),
        _ => None,
    }
}

fn focused_cursor(view_state: &mut ViewState) -> &mut usize {
    match view_state.focus {
        Focus::Pairs => &mut view_state.pair_cursor,
        Focus::Contracts => &mut view_state.contract_cursor,
    }
}

fn handle_bidding(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let slot_count = view_state.session().map(|s| s.board.len()).unwrap_or(0);
    match key_event.code {
        KeyCode::Left | KeyCode::Char('h') => {
            view_state.bid_slot = view_state.bid_slot.saturating_sub(1).max(1);
            None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if view_state.bid_slot < slot_count {
                view_state.bid_slot += 1;
            }
            None
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('+') => {
            view_state.bid_value = (view_state.bid_value + 1).min(MAX_BID);
            None
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('-') => {
            view_state.bid_value = view_state.bid_value.saturating_sub(1);
            None
        }
        KeyCode::Enter => Some(UserCommand::PlaceBid {
            slot: view_state.bid_slot,
            bid: view_state.bid_value,
        }),
        KeyCode::Char('p') => Some(UserCommand::PassTurn),
        _ => None,
    }
}

fn handle_results(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let saved = view_state
        .snapshot
        .as_ref()
        .and_then(|s| s.saved_session_id)
        .is_some();
    match key_event.code {
        KeyCode::Char('s') => Some(UserCommand::SaveSession),
        KeyCode::Enter => Some(UserCommand::OpenScoring),
        KeyCode::Char('n') if saved => Some(UserCommand::Reset),
        KeyCode::Char('n') => {
            view_state.banner = Some(Banner::Error("save the session first (s)".into()));
            None
        }
        _ => None,
    }
}

fn handle_scoring(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let rows = view_state.score_inputs.len();
    match key_event.code {
        KeyCode::Up => {
            view_state.score_cursor = view_state.score_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Tab => {
            if view_state.score_cursor + 1 < rows {
                view_state.score_cursor += 1;
            }
            None
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(input) = view_state.score_inputs.get_mut(view_state.score_cursor) {
                input.push(c);
            }
            None
        }
        KeyCode::Char('-') => {
            if let Some(input) = view_state.score_inputs.get_mut(view_state.score_cursor) {
                if input.is_empty() {
                    input.push('-');
                }
            }
            None
        }
        KeyCode::Backspace => {
            if let Some(input) = view_state.score_inputs.get_mut(view_state.score_cursor) {
                input.pop();
            }
            None
        }
        KeyCode::Enter => match view_state.parsed_scores() {
            Ok(scores) => Some(UserCommand::SubmitScores(scores)),
            Err(player) => {
                view_state.banner = Some(Banner::Error(format!("enter a score for {player}")));
                None
            }
        },
        KeyCode::Esc => Some(UserCommand::SkipScoring),
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::{scoring_snapshot, snapshot, view};
    use std::collections::HashMap;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state_on(screen: Screen, phase: SessionPhase) -> ViewState {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(screen, Some(view(phase))));
        state
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = state_on(Screen::Setup, SessionPhase::ChoosingMethod);
        let mut ev = key(KeyCode::Char('n'));
        ev.kind = KeyEventKind::Release;
        assert_eq!(handle_key(ev, &mut state), None);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = state_on(Screen::Setup, SessionPhase::ChoosingMethod);
        state.confirm_reset = true;
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(ev, &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn quit_needs_confirmation() {
        let mut state = state_on(Screen::Setup, SessionPhase::ChoosingMethod);
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mut state), None);
        assert!(state.confirm_quit);
        // Other keys are blocked while the dialog is up.
        assert_eq!(handle_key(key(KeyCode::Char('a')), &mut state), None);
        assert!(state.confirm_quit);
        assert_eq!(handle_key(key(KeyCode::Char('n')), &mut state), None);
        assert!(!state.confirm_quit);
        handle_key(key(KeyCode::Char('q')), &mut state);
        assert_eq!(handle_key(key(KeyCode::Char('y')), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut state = state_on(Screen::Allocation, SessionPhase::Drafting);
        assert_eq!(handle_key(key(KeyCode::Char('R')), &mut state), None);
        assert!(state.confirm_reset);
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), None);
        assert_eq!(handle_key(key(KeyCode::Char('y')), &mut state), Some(UserCommand::Reset));
        assert!(!state.confirm_reset);
    }

    #[test]
    fn setup_keys_choose_method() {
        let mut state = state_on(Screen::Setup, SessionPhase::ChoosingMethod);
        assert_eq!(
            handle_key(key(KeyCode::Char('a')), &mut state),
            Some(UserCommand::ChooseMethod(DraftMethod::Auction))
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('n')), &mut state),
            Some(UserCommand::ChooseMethod(DraftMethod::Normal))
        );
    }

    #[test]
    fn failed_setup_offers_retry() {
        let mut state = ViewState::default();
        state.apply_snapshot(snapshot(Screen::Setup, None));
        assert_eq!(handle_key(key(KeyCode::Char('n')), &mut state), None);
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), Some(UserCommand::Reset));
    }

    #[test]
    fn drafting_moves_cursor_and_toggles() {
        let mut state = state_on(Screen::Allocation, SessionPhase::Drafting);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.pair_cursor, 2);
        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::TogglePair("F3+E3".into()))
        );

        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, Focus::Contracts);
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::ToggleContract("K2".into()))
        );
        handle_key(key(KeyCode::Up), &mut state);
        handle_key(key(KeyCode::Up), &mut state);
        assert_eq!(state.contract_cursor, 0);
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), Some(UserCommand::ConfirmPick));
    }

    #[test]
    fn bidding_composes_slot_and_bid() {
        let mut state = state_on(Screen::Allocation, SessionPhase::Bidding);
        assert_eq!(state.bid_slot, 1);
        handle_key(key(KeyCode::Right), &mut state);
        handle_key(key(KeyCode::Right), &mut state);
        assert_eq!(state.bid_slot, 2);
        handle_key(key(KeyCode::Left), &mut state);
        handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.bid_slot, 1);

        for _ in 0..20 {
            handle_key(key(KeyCode::Up), &mut state);
        }
        assert_eq!(state.bid_value, MAX_BID);
        handle_key(key(KeyCode::Char('-')), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::PlaceBid { slot: 1, bid: MAX_BID - 1 })
        );
        assert_eq!(handle_key(key(KeyCode::Char('p')), &mut state), Some(UserCommand::PassTurn));
    }

    #[test]
    fn results_keys_save_and_score() {
        let mut state = state_on(Screen::Results, SessionPhase::Complete);
        assert_eq!(handle_key(key(KeyCode::Char('s')), &mut state), Some(UserCommand::SaveSession));
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), Some(UserCommand::OpenScoring));
        assert_eq!(handle_key(key(KeyCode::Char('n')), &mut state), None);
        assert!(matches!(state.banner, Some(Banner::Error(_))));

        if let Some(snap) = state.snapshot.as_mut() {
            snap.saved_session_id = Some(7);
        }
        assert_eq!(handle_key(key(KeyCode::Char('n')), &mut state), Some(UserCommand::Reset));
    }

    #[test]
    fn scoring_types_and_submits() {
        let mut state = ViewState::default();
        state.apply_snapshot(scoring_snapshot(2, HashMap::new()));

        for c in ['-', '4', '2'] {
            handle_key(key(KeyCode::Char(c)), &mut state);
        }
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(state.score_inputs[0], "-4");

        // 'q' opens the quit dialog even here; dismiss it.
        handle_key(key(KeyCode::Char('q')), &mut state);
        handle_key(key(KeyCode::Esc), &mut state);

        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), None);
        assert_eq!(state.banner, Some(Banner::Error("enter a score for Bo".into())));

        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Char('-')), &mut state);
        handle_key(key(KeyCode::Char('9')), &mut state);
        handle_key(key(KeyCode::Char('-')), &mut state);
        assert_eq!(state.score_inputs[1], "-9");

        let expected = HashMap::from([("Ann".to_string(), -4), ("Bo".to_string(), -9)]);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SubmitScores(expected))
        );
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), Some(UserCommand::SkipScoring));
    }
}
