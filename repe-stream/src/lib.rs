#![deny(missing_docs)]
//! Incremental response decoder for streamed chat completions.
//!
//! Consumes the raw bytes of a streaming response, reassembles events that
//! were split across network chunks, and yields the text fragment carried
//! by each event's `choices[0].delta.content`.
//!
//! - [`StreamDecoder`] is the synchronous state machine.
//! - [`decode_fragments`] wraps a blocking chunk source as a lazy iterator.
//! - [`fragment_stream`] wraps an async byte stream (an HTTP body).
//!
//! Decoding is best effort: segments that are not JSON are skipped and
//! never surface as errors. Only transport errors reach the consumer.

pub mod decoder;
pub mod fragments;
pub mod stream;

pub use decoder::{EVENT_DELIMITER, SEGMENT_SEPARATOR, StreamDecoder};
pub use fragments::{Fragments, decode_fragments};
pub use stream::fragment_stream;
