//! Buffering state machine that turns raw response bytes into text fragments.
//!
//! The wire format is a sequence of events separated by `\n\ndata:`. An
//! event body may hold several JSON documents separated by a blank line,
//! each shaped like:
//!
//! ```text
//! { "choices": [ { "delta": { "content": "Hi" } } ] }
//! ```
//!
//! Only `choices[0].delta.content` is read. Bodies that are not JSON (the
//! `[DONE]` sentinel, a truncated document, garbage) are skipped without
//! error.

use std::collections::VecDeque;

use serde_json::Value;

/// Marker separating one event's payload from the next.
pub const EVENT_DELIMITER: &[u8] = b"\n\ndata:";

/// Blank-line separator between JSON documents inside one event.
pub const SEGMENT_SEPARATOR: &[u8] = b"\n\n";

/// Field prefix still attached to the first event of a stream.
const FIELD_PREFIX: &[u8] = b"data:";

/// Incremental decoder for one streamed response.
///
/// Append chunks with [`push`](Self::push) in delivery order and pull
/// fragments with [`next_fragment`](Self::next_fragment). Events are
/// delimited and decoded one at a time on demand, so at most one event's
/// fragments are held between pulls. Call [`finish`](Self::finish) once
/// the source is exhausted to release the trailing event.
///
/// A decoder is not restartable; construct a fresh one per response.
///
/// ```
/// use repe_stream::StreamDecoder;
///
/// let mut decoder = StreamDecoder::new();
/// decoder.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\nda");
/// assert_eq!(decoder.next_fragment(), None);
/// decoder.push(b"ta: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n");
/// assert_eq!(decoder.next_fragment().as_deref(), Some("Hi"));
/// decoder.finish();
/// assert_eq!(decoder.drain().collect::<Vec<_>>(), vec![" there"]);
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    /// Bytes before this offset belong to events already delimited.
    start: usize,
    /// No delimiter starts before this offset.
    scanned: usize,
    /// Fragments of the most recently delimited event not yet pulled.
    pending: VecDeque<String>,
    finished: bool,
}

impl StreamDecoder {
    /// Create a decoder with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Nothing is decoded until the next pull.
    pub fn push(&mut self, chunk: &[u8]) {
        // Reclaim the consumed prefix once it outweighs the live bytes.
        if self.start > 0 && self.start >= self.buffer.len() - self.start {
            self.buffer.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Mark the end of input. The bytes after the last delimiter become
    /// the final event; whatever of it does not decode is discarded.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Next fragment, in stream order.
    ///
    /// Returns `None` when no complete event is buffered. Before
    /// [`finish`](Self::finish) that means "push more"; after it, the
    /// response is exhausted.
    pub fn next_fragment(&mut self) -> Option<String> {
        loop {
            if let Some(fragment) = self.pending.pop_front() {
                return Some(fragment);
            }
            let (begin, end) = self.next_event()?;
            decode_candidate(&self.buffer[begin..end], &mut self.pending);
        }
    }

    /// Pull every fragment currently available.
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        std::iter::from_fn(move || self.next_fragment())
    }

    /// Number of bytes not yet delimited into an event.
    pub fn buffered(&self) -> usize {
        self.buffer.len() - self.start
    }

    /// Byte range of the next complete event, advancing past it.
    fn next_event(&mut self) -> Option<(usize, usize)> {
        let from = self.scanned.max(self.start);
        if let Some(offset) = find(&self.buffer[from..], EVENT_DELIMITER) {
            let begin = self.start;
            let end = from + offset;
            self.start = end + EVENT_DELIMITER.len();
            self.scanned = self.start;
            return Some((begin, end));
        }

        if self.finished && self.start < self.buffer.len() {
            let begin = self.start;
            self.start = self.buffer.len();
            self.scanned = self.start;
            return Some((begin, self.buffer.len()));
        }

        // A delimiter straddling the next chunk boundary can start no
        // earlier than this.
        self.scanned = self
            .buffer
            .len()
            .saturating_sub(EVENT_DELIMITER.len() - 1)
            .max(self.start);
        None
    }
}

/// Decode one delimited event body, queueing at most one fragment per
/// JSON document it contains.
fn decode_candidate(candidate: &[u8], fragments: &mut VecDeque<String>) {
    for segment in segments(candidate) {
        let segment = segment.trim_ascii();
        if segment.is_empty() {
            continue;
        }
        let payload = segment.strip_prefix(FIELD_PREFIX).unwrap_or(segment);

        let document: Value = match serde_json::from_slice(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::trace!(len = payload.len(), error = %e, "skipping non-JSON segment");
                continue;
            }
        };

        if let Some(fragment) = extract_fragment(&document) {
            fragments.push_back(fragment);
        }
    }
}

/// `choices[0].delta.content`, or `""` when the content is missing.
///
/// Returns `None` when `choices` is absent or empty.
fn extract_fragment(document: &Value) -> Option<String> {
    let choice = document.get("choices")?.as_array()?.first()?;
    let content = choice["delta"]["content"].as_str().unwrap_or_default();
    Some(content.to_string())
}

/// Split on [`SEGMENT_SEPARATOR`], always yielding at least one segment.
fn segments(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(bytes);
    std::iter::from_fn(move || {
        let bytes = rest?;
        match find(bytes, SEGMENT_SEPARATOR) {
            Some(pos) => {
                rest = Some(&bytes[pos + SEGMENT_SEPARATOR.len()..]);
                Some(&bytes[..pos])
            }
            None => {
                rest = None;
                Some(bytes)
            }
        }
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({ "choices": [{ "delta": { "content": content } }] })
        )
    }

    fn decode_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut decoder = StreamDecoder::new();
        let mut fragments = Vec::new();
        for chunk in chunks {
            decoder.push(chunk);
            fragments.extend(decoder.drain());
        }
        decoder.finish();
        fragments.extend(decoder.drain());
        fragments
    }

    #[test]
    fn decodes_two_events_in_one_chunk() {
        let input = format!("{}{}", event("Hi"), event(" there"));
        assert_eq!(decode_all(&[input.as_bytes()]), vec!["Hi", " there"]);
    }

    #[test]
    fn every_two_chunk_split_yields_same_fragments() {
        let input = br#"data: {"choices":[{"delta":{"content":"Hi"}}]}

data: {"choices":[{"delta":{"content":" there"}}]}

"#;
        for split in 0..=input.len() {
            let (a, b) = input.split_at(split);
            assert_eq!(decode_all(&[a, b]), vec!["Hi", " there"], "split at {split}");
        }
    }

    #[test]
    fn missing_content_yields_empty_fragment() {
        let input: &[u8] = b"data: {\"choices\":[{\"delta\":{}}]}\n\n";
        assert_eq!(decode_all(&[input]), vec![""]);
    }

    #[test]
    fn null_content_and_missing_delta_yield_empty_fragment() {
        let input: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":null}}]}\n\ndata: {\"choices\":[{\"index\":0}]}\n\n";
        assert_eq!(decode_all(&[input]), vec!["", ""]);
    }

    #[test]
    fn empty_or_absent_choices_yield_nothing() {
        let input: &[u8] = b"data: {\"choices\":[]}\n\ndata: {\"id\":\"x\"}\n\ndata: {\"choices\":null}\n\n";
        assert!(decode_all(&[input]).is_empty());
    }

    #[test]
    fn malformed_event_is_skipped() {
        let input = format!("data: not-json\n\n{}", event("ok"));
        assert_eq!(decode_all(&[input.as_bytes()]), vec!["ok"]);
    }

    #[test]
    fn done_sentinel_is_skipped() {
        let input = format!("{}data: [DONE]\n\n", event("last"));
        assert_eq!(decode_all(&[input.as_bytes()]), vec!["last"]);
    }

    #[test]
    fn malformed_segment_does_not_suppress_sibling_segments() {
        // Two documents in one event body, the first truncated.
        let input: &[u8] = b"data: {\"choices\":[{\"delta\n\n{\"choices\":[{\"delta\":{\"content\":\"b\"}}]}";
        assert_eq!(decode_all(&[input]), vec!["b"]);
    }

    #[test]
    fn trailing_event_without_delimiter_is_flushed_once() {
        let input = b"data: {\"choices\":[{\"delta\":{\"content\":\"tail\"}}]}";
        let mut decoder = StreamDecoder::new();
        decoder.push(input);
        assert_eq!(decoder.next_fragment(), None);
        assert_eq!(decoder.buffered(), input.len());
        decoder.finish();
        assert_eq!(decoder.next_fragment().as_deref(), Some("tail"));
        assert_eq!(decoder.next_fragment(), None);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn pull_yields_only_completed_events() {
        let mut decoder = StreamDecoder::new();
        let first = event("a");
        decoder.push(first.as_bytes());
        assert_eq!(decoder.next_fragment(), None);
        // The delimiter arrives with the start of the next event.
        decoder.push(b"data: {\"cho");
        assert_eq!(decoder.next_fragment().as_deref(), Some("a"));
        assert_eq!(decoder.next_fragment(), None);
        assert_eq!(decoder.buffered(), b" {\"cho".len());
    }

    #[test]
    fn each_pull_delimits_a_single_event() {
        let body: String = (0..1000).map(|i| event(&format!("t{i}"))).collect();
        let mut decoder = StreamDecoder::new();
        decoder.push(body.as_bytes());
        assert_eq!(decoder.buffered(), body.len());

        assert_eq!(decoder.next_fragment().as_deref(), Some("t0"));
        // Only the first event (and its delimiter) has been consumed.
        let consumed = event("t0").len() - SEGMENT_SEPARATOR.len() + EVENT_DELIMITER.len();
        assert_eq!(decoder.buffered(), body.len() - consumed);
        assert!(decoder.pending.is_empty());

        assert_eq!(decoder.next_fragment().as_deref(), Some("t1"));
        assert!(decoder.pending.is_empty());
    }

    #[test]
    fn sibling_segments_wait_in_pending_until_pulled() {
        let input: &[u8] = b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n{\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\ndata: x";
        let mut decoder = StreamDecoder::new();
        decoder.push(input);
        assert_eq!(decoder.next_fragment().as_deref(), Some("a"));
        assert_eq!(decoder.pending.len(), 1);
        assert_eq!(decoder.next_fragment().as_deref(), Some("b"));
        assert_eq!(decoder.next_fragment(), None);
    }

    #[test]
    fn consumed_prefix_is_reclaimed_on_push() {
        let mut decoder = StreamDecoder::new();
        let body = format!("{}{}", event("a"), event("b"));
        decoder.push(body.as_bytes());
        assert_eq!(decoder.drain().count(), 1);
        let live = decoder.buffered();

        decoder.push(b"data: ");
        assert_eq!(decoder.start, 0);
        assert_eq!(decoder.buffer.len(), live + b"data: ".len());
        assert_eq!(decoder.next_fragment().as_deref(), Some("b"));
    }

    #[test]
    fn split_inside_multibyte_character() {
        let input = event("héllo wörld ✓");
        let bytes = input.as_bytes();
        let mid = input.find('✓').map(|i| i + 1).unwrap_or(0);
        assert_eq!(
            decode_all(&[&bytes[..mid], &bytes[mid..]]),
            vec!["héllo wörld ✓"]
        );
    }

    #[test]
    fn one_byte_chunks() {
        let input = format!("{}{}{}", event("a"), event("b"), event("c"));
        let chunks: Vec<&[u8]> = input.as_bytes().chunks(1).collect();
        assert_eq!(decode_all(&chunks), vec!["a", "b", "c"]);
    }

    #[test]
    fn garbage_tail_is_discarded() {
        let input = format!("{}data: {{\"choices\":[{{\"del", event("a"));
        assert_eq!(decode_all(&[input.as_bytes()]), vec!["a"]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(decode_all(&[]).is_empty());
        assert!(decode_all(&[&b""[..]]).is_empty());
    }

    #[test]
    fn segments_split_on_blank_lines() {
        let parts: Vec<&[u8]> = segments(b"a\n\nb\n\n").collect();
        assert_eq!(parts, vec![&b"a"[..], &b"b"[..], &b""[..]]);
    }
}
