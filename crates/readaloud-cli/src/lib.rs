//! `readaloud` command-line front end.
//!
//! The binary in `main.rs` is the composition root; this library holds the
//! parser, the wiring in [`bootstrap`] and the command handlers.

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod presentation;

pub use bootstrap::CliContext;
pub use commands::{Commands, PlayArgs};
pub use parser::Cli;
