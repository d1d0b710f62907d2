// Auction board widget: turn-order slots, holders, and each player's standing.
//
// Table: Slot, Holder, Bid, Start score. The slot being bid on is
// highlighted; the title shows the bid being composed.

use barrage_core::record::BASE_STARTING_SCORE;
use barrage_draft::auction::PlayerAuctionStatus;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, Row, Table};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(session) = state.session() else {
        return;
    };

    let board_height = session.board.len() as u16 + 3;
    let sections = Layout::vertical([Constraint::Length(board_height), Constraint::Min(3)]).split(area);

    let header = Row::new(vec![
        Cell::from("Slot"),
        Cell::from("Holder"),
        Cell::from("Bid"),
        Cell::from("Start"),
    ])
    .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = session
        .board
        .iter()
        .map(|(slot, holding)| {
            let style = if *slot == state.bid_slot {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            let (holder, bid, start) = match holding {
                Some(h) => (
                    h.player.clone(),
                    h.bid.to_string(),
                    (BASE_STARTING_SCORE - i32::from(h.bid)).to_string(),
                ),
                None => ("-".to_string(), String::new(), String::new()),
            };
            Row::new(vec![
                Cell::from(slot.to_string()),
                Cell::from(holder),
                Cell::from(bid),
                Cell::from(start),
            ])
            .style(style)
        })
        .collect();

    let bidder = session.current_player.as_deref().unwrap_or("-");
    let title = format!(
        " Turn-order auction: {bidder} bids {} on slot {} ",
        state.bid_value, state.bid_slot
    );

    let widths = [
        Constraint::Length(5),
        Constraint::Min(12),
        Constraint::Length(4),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, sections[0]);

    let items: Vec<ListItem> = session
        .statuses
        .iter()
        .map(|(player, status)| {
            let (text, color) = status_text(status);
            ListItem::new(Line::from(vec![
                Span::raw(format!("  {player}: ")),
                Span::styled(text, Style::default().fg(color)),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Players "));
    frame.render_widget(list, sections[1]);
}

/// Human-readable standing and its color.
pub fn status_text(status: &PlayerAuctionStatus) -> (String, Color) {
    match status {
        PlayerAuctionStatus::Bidding => ("no bid yet".to_string(), Color::Gray),
        PlayerAuctionStatus::Placed { slot, bid } => (format!("slot {slot} for {bid}"), Color::Green),
        PlayerAuctionStatus::Displaced => ("displaced, must bid again".to_string(), Color::Red),
    }
}
