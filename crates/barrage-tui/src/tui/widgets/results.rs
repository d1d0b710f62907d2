// Result widget: the finished allocation in first-round order.
//
// Table: Turn, Player, Faction, Executive, Contract, Bid, Start.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(record) = state.record() else {
        let paragraph = Paragraph::new("  No result yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Result "));
        frame.render_widget(paragraph, area);
        return;
    };

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Player"),
        Cell::from("Faction"),
        Cell::from("Executive"),
        Cell::from("Contract"),
        Cell::from("Bid"),
        Cell::from("Start"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = record
        .results_by_first_round()
        .into_iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(
                    record
                        .first_round_position(&r.player)
                        .map(|p| p.to_string())
                        .unwrap_or_default(),
                ),
                Cell::from(r.player.clone()),
                Cell::from(r.faction.clone()),
                Cell::from(r.role.clone()),
                Cell::from(r.contract.clone()),
                Cell::from(r.bid.map(|b| b.to_string()).unwrap_or_else(|| "-".into())),
                Cell::from(r.starting_score.to_string()),
            ])
        })
        .collect();

    let saved = match state.snapshot.as_ref().and_then(|s| s.saved_session_id) {
        Some(id) => format!("saved #{id}"),
        None if state.snapshot.as_ref().is_some_and(|s| s.scoring.is_some()) => "stored".to_string(),
        None => "not saved".to_string(),
    };
    let title = format!(" Result ({}, {}, {}) ", record.method, record.board_variant, saved);

    let widths = [
        Constraint::Length(2),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(10),
        Constraint::Min(10),
        Constraint::Length(3),
        Constraint::Length(5),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}
