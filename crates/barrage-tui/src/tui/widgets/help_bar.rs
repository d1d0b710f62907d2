// Help bar widget: key hints for the current screen.

use barrage_app::protocol::Screen;
use barrage_draft::session::SessionPhase;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        hint(state),
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

/// Shortcut hints for whatever the user is looking at.
pub fn hint(state: &ViewState) -> &'static str {
    match state.screen() {
        Screen::Setup if state.session().is_none() => " Enter:Retry sampling | q:Quit",
        Screen::Setup => " n:Normal draft | a:Auction | R:Resample | q:Quit",
        Screen::Allocation if state.phase() == Some(SessionPhase::Bidding) => {
            " Left/Right:Slot | Up/Down:Bid | Enter:Place bid | p:Pass | R:Reset | q:Quit"
        }
        Screen::Allocation => " Up/Down:Move | Tab:Pairs/Contracts | Space:Select | Enter:Confirm | R:Reset | q:Quit",
        Screen::Results => " Enter:Enter scores | s:Save | n:Next session | R:Reset | q:Quit",
        Screen::Scoring => " 0-9/-:Type | Up/Down:Player | Enter:Submit | Esc:Skip | q:Quit",
    }
}
