// Score entry widget: one input row per player of the session being scored.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let target = state.snapshot.as_ref().and_then(|s| s.scoring.as_ref());

    let mut items: Vec<ListItem> = Vec::new();
    if let Some(created_at) = target.and_then(|t| t.created_at.as_deref()) {
        items.push(ListItem::new(Span::styled(
            format!("  Played {created_at}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    for (i, (player, input)) in state.score_players.iter().zip(&state.score_inputs).enumerate() {
        let focused = i == state.score_cursor;
        let pointer = if focused { "> " } else { "  " };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let shown = if input.is_empty() && focused { "_" } else { input.as_str() };
        items.push(ListItem::new(Line::from(vec![
            Span::raw(format!("{pointer}{player:<16}")),
            Span::styled(shown.to_string(), value_style),
        ])));
    }

    let title = match target {
        Some(t) => format!(" Final scores: session {} ", t.session_id),
        None => " Final scores ".to_string(),
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}
