// Picks widget: draft order with what each player has taken so far.
//
// Before a method is chosen this shows the seating order and, if sampling
// failed, the reason.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut items: Vec<ListItem> = Vec::new();

    if let Some(error) = state.snapshot.as_ref().and_then(|s| s.setup_error.as_ref()) {
        items.push(ListItem::new(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
    }

    let title = match state.session() {
        Some(session) if !session.draft_order.is_empty() => {
            let current = session.current_player.as_deref();
            for (i, player) in session.draft_order.iter().enumerate() {
                let pick = session.picks.iter().find(|p| &p.player == player);
                let text = match pick {
                    Some(p) => format!("{}. {}: {}, {}", i + 1, player, p.pair.label(), p.contract.name),
                    None => format!("{}. {}", i + 1, player),
                };
                let style = if Some(player.as_str()) == current {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else if pick.is_some() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };
                items.push(ListItem::new(Line::from(Span::styled(format!("  {text}"), style))));
            }
            " Draft order "
        }
        Some(session) => {
            for (i, player) in session.turn_sequence.iter().enumerate() {
                items.push(ListItem::new(format!("  {}. {}", i + 1, player)));
            }
            " Seating "
        }
        None => " Seating ",
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}
