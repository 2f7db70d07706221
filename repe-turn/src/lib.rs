#![deny(missing_docs)]
//! Shared toolkit for repe-chat.
//!
//! Provides the [`Provider`] trait for streaming model calls, the
//! [`ConversationState`] a turn runs against, the [`SteeringDirective`]
//! attached to each request, and the backend configuration types.

pub mod config;
pub mod conversation;
pub mod provider;
pub mod types;

// Re-exports
pub use config::{ApiKey, Backend};
pub use conversation::ConversationState;
pub use provider::{Provider, ProviderError, StreamEvent, StreamHandle};
pub use types::*;
