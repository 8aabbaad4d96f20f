// src/ports/mod.rs
pub mod report;
pub mod tui;

pub use report::format_note;
pub use tui::TerminalView;
