//! Adapters - concrete implementations of the ports plus the terminal
//! front end.

pub mod ai;
pub mod sheets;
pub mod terminal;
