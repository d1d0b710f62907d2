// TUI widget modules, one per panel.

pub mod auction_board;
pub mod candidates;
pub mod confirm;
pub mod help_bar;
pub mod picks;
pub mod results;
pub mod scoring;
pub mod status_bar;
pub mod turn_banner;
