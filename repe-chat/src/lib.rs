#![deny(missing_docs)]
//! Terminal chat client for representation-steered language models.
//!
//! The library half holds everything the binary wires together:
//!
//! - [`config`]: secrets file, environment overrides, validation
//! - [`backend`]: the provider chosen once at startup
//! - [`command`]: parsing of REPL input lines
//! - [`session`]: running one streamed turn against a conversation

pub mod backend;
pub mod command;
pub mod config;
pub mod session;

pub use backend::ChatBackend;
pub use command::{Command, CommandError};
pub use config::{ChatConfig, ConfigError};
pub use session::{TurnError, TurnOutcome, run_turn};
