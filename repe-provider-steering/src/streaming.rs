//! Bridge from the HTTP body to [`StreamEvent`]s.

use futures::StreamExt;
use repe_turn::{StreamEvent, StreamHandle};
use reqwest::Response;

/// Wrap an HTTP response body into a [`StreamHandle`] that emits [`StreamEvent`]s.
///
/// A read error mid-body becomes a single [`StreamEvent::Error`] and ends
/// the stream.
pub(crate) fn stream_completion(response: Response) -> StreamHandle {
    let fragments = repe_stream::fragment_stream(response.bytes_stream());
    StreamHandle::new(fragments.map(|item| match item {
        Ok(text) => StreamEvent::TextDelta(text),
        Err(e) => StreamEvent::Error(format!("stream read error: {e}")),
    }))
}
