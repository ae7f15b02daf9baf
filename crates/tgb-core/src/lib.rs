//! Core logic for the Telegram channel bridge.
//!
//! This crate is intentionally framework-agnostic. The messaging platform client
//! lives behind the `MessageSource` port, implemented in an adapter crate; the
//! checkpoint file lives behind `CheckpointStore`.

pub mod channel;
pub mod checkpoint;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod media;
pub mod messaging;
pub mod output;
pub mod sync;
#[cfg(test)]
mod testing;
pub mod utils;

pub use errors::{Error, Result};
