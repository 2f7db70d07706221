//! Async adapter over an HTTP body byte stream.

use futures::{Stream, StreamExt};

use crate::decoder::StreamDecoder;

/// Decode a fallible byte stream (e.g. `reqwest::Response::bytes_stream()`)
/// into a stream of text fragments.
///
/// Fragments are yielded as soon as the chunk that completes their event
/// arrives; events are decoded one at a time as the consumer polls.
/// A transport error is yielded once and ends the stream; buffered bytes
/// are not flushed after a failure. When the source ends cleanly, the
/// trailing event is decoded and yielded.
pub fn fragment_stream<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<String, E>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Send + 'static,
{
    async_stream::stream! {
        let mut decoder = StreamDecoder::new();
        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut chunks = 0usize;

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!(chunks, buffered = decoder.buffered(), "byte stream failed");
                    yield Err(e);
                    return;
                }
            };
            chunks += 1;

            decoder.push(chunk.as_ref());
            while let Some(fragment) = decoder.next_fragment() {
                yield Ok(fragment);
            }
        }

        tracing::trace!(chunks, buffered = decoder.buffered(), "byte stream exhausted");
        decoder.finish();
        while let Some(fragment) = decoder.next_fragment() {
            yield Ok(fragment);
        }
    }
}
