//! Terminal surface for the study binary.

mod ui;

pub use ui::TerminalUi;
