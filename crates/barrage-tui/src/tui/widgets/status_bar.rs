// Status bar widget: screen, table size, and the last notice or error.

use barrage_app::protocol::Screen;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{Banner, ViewState};

/// Layout: [title] [screen] [players/extra/board] [banner]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![
        Span::styled(
            " Barrage setup ",
            Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {} ", screen_label(state.screen())), Style::default().fg(Color::Cyan)),
    ];

    if let Some(snapshot) = &state.snapshot {
        spans.push(Span::styled("| ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!(
                "{} players +{} | {} ",
                snapshot.players.len(),
                snapshot.extra_candidates,
                snapshot.board_variant
            ),
            Style::default().fg(Color::White),
        ));
    }

    match &state.banner {
        Some(Banner::Notice(text)) => {
            spans.push(Span::styled(format!("| {text}"), Style::default().fg(Color::Green)));
        }
        Some(Banner::Error(text)) => {
            spans.push(Span::styled(
                format!("| {text}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        None => {}
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Setup => "Setup",
        Screen::Allocation => "Allocation",
        Screen::Results => "Results",
        Screen::Scoring => "Scoring",
    }
}
