// Terminal front end for the Barrage setup assistant.

pub mod tui;
