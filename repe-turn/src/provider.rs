//! Provider trait for streaming LLM backends.
//!
//! The [`Provider`] trait uses RPITIT (return-position `impl Trait` in traits)
//! and is intentionally NOT object-safe. Callers that choose a backend at
//! runtime hold an enum of concrete providers instead of a trait object.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use thiserror::Error;

use crate::types::ChatRequest;

/// Errors from LLM providers, raised before the response starts streaming.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Rate limited by the provider.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimit {
        /// Suggested retry delay, if provided by the API.
        retry_after: Option<Duration>,
    },
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Provider service is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    // Terminal errors
    /// Authentication/authorization failure.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// Malformed or invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Requested model does not exist.
    #[error("model not found: {0}")]
    ModelNotFound(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status.
    ///
    /// `retry_after` is whatever hint the backend supplied for a 429; each
    /// backend reads it from its own place (header or error body).
    #[must_use]
    pub fn from_status(status: u16, retry_after: Option<Duration>, body: &str) -> Self {
        let body = body.to_string();
        match status {
            401 | 403 => Self::Authentication(body),
            400 | 422 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(body),
            429 => Self::RateLimit { retry_after },
            500 | 502 | 503 | 504 => Self::ServiceUnavailable(body),
            other => Self::InvalidRequest(format!("HTTP {other}: {body}")),
        }
    }

    /// Whether this error is likely transient and the request can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimit { .. } | Self::Timeout(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// An event emitted while a response streams.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental text content. May be empty.
    TextDelta(String),
    /// The transport failed; no further events follow.
    Error(String),
}

/// Handle to a streaming response.
pub struct StreamHandle {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = StreamEvent> + Send>>,
}

impl StreamHandle {
    /// Wrap any event stream.
    pub fn new(stream: impl Stream<Item = StreamEvent> + Send + 'static) -> Self {
        Self {
            receiver: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// LLM provider interface.
///
/// Each backend (steering endpoint, generic completions API) implements
/// this trait. The request carries the whole conversation; providers hold
/// no per-conversation state.
pub trait Provider: Send + Sync {
    /// Send a request and return a handle to its streamed response.
    ///
    /// Errors returned here happen before any content arrives. Failures
    /// after that surface as a final [`StreamEvent::Error`].
    fn complete_stream(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn provider_error_display() {
        assert_eq!(
            ProviderError::Authentication("bad key".into()).to_string(),
            "authentication failed: bad key"
        );
        assert_eq!(
            ProviderError::RateLimit {
                retry_after: Some(Duration::from_secs(3))
            }
            .to_string(),
            "rate limited, retry after Some(3s)"
        );
        assert_eq!(
            ProviderError::InvalidRequest("bad json".into()).to_string(),
            "invalid request: bad json"
        );
    }

    #[test]
    fn provider_error_retryable() {
        assert!(ProviderError::RateLimit { retry_after: None }.is_retryable());
        assert!(ProviderError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(ProviderError::ServiceUnavailable("down".into()).is_retryable());
        assert!(!ProviderError::Authentication("bad key".into()).is_retryable());
        assert!(!ProviderError::ModelNotFound("x".into()).is_retryable());
    }

    #[test]
    fn status_classification() {
        let hint = Some(Duration::from_secs(4));
        assert!(matches!(
            ProviderError::from_status(403, None, "no"),
            ProviderError::Authentication(m) if m == "no"
        ));
        assert!(matches!(
            ProviderError::from_status(422, None, "bad field"),
            ProviderError::InvalidRequest(_)
        ));
        assert!(matches!(
            ProviderError::from_status(404, None, ""),
            ProviderError::ModelNotFound(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, hint, ""),
            ProviderError::RateLimit { retry_after } if retry_after == hint
        ));
        for status in [500, 502, 503, 504] {
            assert!(ProviderError::from_status(status, None, "").is_retryable());
        }
        assert!(matches!(
            ProviderError::from_status(418, None, "teapot"),
            ProviderError::InvalidRequest(m) if m == "HTTP 418: teapot"
        ));
    }

    #[tokio::test]
    async fn stream_handle_wraps_any_stream() {
        let mut handle = StreamHandle::new(futures::stream::iter(vec![
            StreamEvent::TextDelta("a".into()),
            StreamEvent::Error("gone".into()),
        ]));
        assert_eq!(
            handle.receiver.next().await,
            Some(StreamEvent::TextDelta("a".into()))
        );
        assert_eq!(
            handle.receiver.next().await,
            Some(StreamEvent::Error("gone".into()))
        );
        assert_eq!(handle.receiver.next().await, None);
    }
}
