//! SSE streaming for the Chat Completions API.
//!
//! OpenAI frames each chunk as `data: {...}\n\n` and ends with
//! `data: [DONE]`. The shared decoder handles both: the sentinel is not
//! JSON and is dropped.

use futures::StreamExt;
use repe_turn::{StreamEvent, StreamHandle};
use reqwest::Response;

/// Wrap an HTTP response body into a [`StreamHandle`] that emits [`StreamEvent`]s.
pub(crate) fn stream_completion(response: Response) -> StreamHandle {
    let fragments = repe_stream::fragment_stream(response.bytes_stream());
    StreamHandle::new(fragments.map(|item| match item {
        Ok(text) => StreamEvent::TextDelta(text),
        Err(e) => StreamEvent::Error(format!("stream read error: {e}")),
    }))
}
