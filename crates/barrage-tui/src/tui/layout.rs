// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Turn Banner (3 rows)                              |
// +-------------------------+------------------------+
// | Main Panel (60%)        | Sidebar (40%)          |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: screen name, table size, last notice or error.
    pub status_bar: Rect,
    /// Seating order and whose turn it is.
    pub banner: Rect,
    pub main_panel: Rect,
    pub sidebar: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // turn banner
            Constraint::Min(8),    // main + sidebar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(vertical[2]);

    AppLayout {
        status_bar: vertical[0],
        banner: vertical[1],
        main_panel: horizontal[0],
        sidebar: horizontal[1],
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_zones_stack_and_fill_width() {
        let area = Rect::new(0, 0, 120, 40);
        let layout = build_layout(area);

        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.banner.height, 3);
        assert_eq!(layout.help_bar.height, 1);
        assert_eq!(layout.help_bar.y, 39);
        assert_eq!(layout.main_panel.y, 4);
        assert_eq!(layout.main_panel.height, 35);
        assert_eq!(layout.main_panel.width + layout.sidebar.width, 120);
        assert_eq!(layout.main_panel.width, 72);
        assert_eq!(layout.sidebar.x, layout.main_panel.x + layout.main_panel.width);
    }

    #[test]
    fn layout_survives_tiny_terminal() {
        let layout = build_layout(Rect::new(0, 0, 20, 6));
        assert_eq!(layout.status_bar.width, 20);
    }
}
