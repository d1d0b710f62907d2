// Turn banner widget: seating order with the acting player highlighted.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title(" Seating ");

    let Some(session) = state.session() else {
        let paragraph = Paragraph::new("  No session sampled.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let current = session.current_player.as_deref();
    let mut spans = vec![Span::raw(" ")];
    for (i, player) in session.turn_sequence.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }
        let style = if Some(player.as_str()) == current {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(player.clone(), style));
    }
    if let Some(player) = current {
        spans.push(Span::styled(
            format!("   to act: {player}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
