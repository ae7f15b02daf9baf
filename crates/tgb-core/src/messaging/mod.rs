//! Read-side messaging abstractions (Telegram user client today).

pub mod port;
pub mod types;
