#![deny(missing_docs)]
//! Steering-enabled completions endpoint provider for repe-turn.
//!
//! Implements [`repe_turn::Provider`] for a chat endpoint that accepts a
//! `repe_coefficient` alongside the usual chat-completions fields and
//! streams delta events back. The response body is decoded by
//! [`repe_stream`].

pub mod client;
pub(crate) mod error;
pub mod mapping;
pub(crate) mod streaming;

pub use client::SteeringProvider;

// Re-export repe-turn for convenience
pub use repe_turn::{ProviderError, StreamEvent, StreamHandle};
