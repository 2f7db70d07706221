#![deny(missing_docs)]
//! OpenAI-compatible chat completions provider for repe-turn.
//!
//! Streams `POST /v1/chat/completions` responses through the same delta
//! decoder as the steering backend. This backend has no steering input;
//! the directive on each request is ignored.

pub mod client;
pub(crate) mod error;
pub mod mapping;
pub(crate) mod streaming;

pub use client::OpenAi;

// Re-export repe-turn for convenience
pub use repe_turn::{ProviderError, StreamEvent, StreamHandle};
