//! One streamed turn against a conversation.

use std::io::Write;

use futures::StreamExt;
use repe_turn::{ConversationState, Provider, ProviderError, SteeringDirective, StreamEvent};
use thiserror::Error;

/// Why a turn did not complete. History is unchanged in every case.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TurnError {
    /// The request failed before any content arrived.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The response stream broke partway through.
    #[error("response interrupted: {0}")]
    Stream(String),
    /// Fragments could not be written to the output.
    #[error("failed to write response: {0}")]
    Output(#[from] std::io::Error),
}

/// A completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Concatenation of every fragment, as committed to history.
    pub response: String,
    /// Number of fragments received, empty ones included.
    pub fragments: usize,
}

/// Send `prompt` with the current history, write each fragment to `sink`
/// as it arrives, and commit the exchange once the stream ends cleanly.
///
/// The history is only touched after the last fragment, so dropping the
/// returned future cancels the turn without leaving a dangling user
/// message behind.
pub async fn run_turn<P, W>(
    provider: &P,
    state: &mut ConversationState,
    prompt: &str,
    steering: SteeringDirective,
    sink: &mut W,
) -> Result<TurnOutcome, TurnError>
where
    P: Provider,
    W: Write + ?Sized,
{
    let request = state.request_for(prompt, steering);
    tracing::debug!(
        history = state.len(),
        coefficient = steering.coefficient(),
        concept = %steering.concept(),
        "starting turn"
    );

    let mut handle = match provider.complete_stream(request).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(retryable = err.is_retryable(), error = %err, "request failed");
            return Err(err.into());
        }
    };

    let mut response = String::new();
    let mut fragments = 0usize;
    while let Some(event) = handle.receiver.next().await {
        match event {
            StreamEvent::TextDelta(text) => {
                sink.write_all(text.as_bytes())?;
                sink.flush()?;
                response.push_str(&text);
                fragments += 1;
            }
            StreamEvent::Error(message) => {
                tracing::warn!(fragments, error = %message, "response stream failed");
                return Err(TurnError::Stream(message));
            }
        }
    }

    tracing::debug!(fragments, bytes = response.len(), "turn complete");
    state.commit_turn(prompt, response.clone());
    Ok(TurnOutcome {
        response,
        fragments,
    })
}
