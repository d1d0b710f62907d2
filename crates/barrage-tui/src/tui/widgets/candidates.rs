// Candidates widget: the faction/role pairs and contracts still in the pool.
//
// Two stacked lists. While drafting, the focused list shows a cursor and the
// current player's selection is marked with [x]. Catalog descriptions are
// shown dimmed after each name.

use barrage_core::catalog::CatalogItem;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::tui::{Focus, ViewState};

/// Render both candidate lists into `area`. `interactive` enables the
/// cursor and selection markers.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, interactive: bool) {
    let Some(session) = state.session() else {
        let message = state
            .snapshot
            .as_ref()
            .and_then(|s| s.setup_error.clone())
            .unwrap_or_else(|| "Waiting for the first session...".to_string());
        let paragraph = Paragraph::new(format!("  {message}"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title(" Candidates "));
        frame.render_widget(paragraph, area);
        return;
    };

    let sections = Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);

    let pair_rows: Vec<Row> = session
        .pairs
        .iter()
        .map(|p| Row {
            label: p.label(),
            detail: join_details(&[&p.faction, &p.role]),
            selected: session.selection.pair.as_deref() == Some(p.id.as_str()),
        })
        .collect();
    let contract_rows: Vec<Row> = session
        .contracts
        .iter()
        .map(|c| Row {
            label: c.name.clone(),
            detail: join_details(&[c]),
            selected: session.selection.contract.as_deref() == Some(c.id.as_str()),
        })
        .collect();

    let pair_cursor = (interactive && state.focus == Focus::Pairs).then_some(state.pair_cursor);
    let contract_cursor =
        (interactive && state.focus == Focus::Contracts).then_some(state.contract_cursor);

    frame.render_widget(
        candidate_list(" Factions / Executives ", &pair_rows, pair_cursor, interactive),
        sections[0],
    );
    frame.render_widget(
        candidate_list(" Contracts ", &contract_rows, contract_cursor, interactive),
        sections[1],
    );
}

struct Row {
    label: String,
    detail: Option<String>,
    selected: bool,
}

/// Descriptions of the given items joined with "; ", if any are set.
pub fn join_details(items: &[&CatalogItem]) -> Option<String> {
    let parts: Vec<&str> = items
        .iter()
        .filter_map(|i| i.description.as_deref())
        .collect();
    (!parts.is_empty()).then(|| parts.join("; "))
}

fn candidate_list<'a>(
    title: &'a str,
    rows: &[Row],
    cursor: Option<usize>,
    interactive: bool,
) -> List<'a> {
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let pointer = if cursor == Some(i) { "> " } else { "  " };
            let mark = match (interactive, row.selected) {
                (false, _) => "",
                (true, true) => "[x] ",
                (true, false) => "[ ] ",
            };
            let style = if row.selected {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if cursor == Some(i) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let mut spans = vec![Span::styled(format!("{pointer}{mark}{}", row.label), style)];
            if let Some(detail) = &row.detail {
                spans.push(Span::styled(
                    format!("  {detail}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let border = if cursor.is_some() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    )
}
