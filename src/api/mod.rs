//! API Module
//!
//! Operator-facing command surface over `logic`.
//!
//! Structure:
//! - commands.rs: command parsing and handlers

pub mod commands;

pub use commands::{execute, Command, CommandContext, HELP};
