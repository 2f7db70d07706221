//! Lazy iterator adapter for blocking byte sources.

use std::iter::FusedIterator;

use crate::decoder::StreamDecoder;

/// Lazily decode a blocking chunk source into text fragments.
///
/// A chunk is pulled only when no complete event is buffered, and events
/// are decoded one at a time as fragments are requested.
pub fn decode_fragments<I>(source: I) -> Fragments<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    Fragments {
        source: source.into_iter(),
        decoder: StreamDecoder::new(),
        exhausted: false,
    }
}

/// Iterator returned by [`decode_fragments`].
#[derive(Debug)]
pub struct Fragments<I> {
    source: I,
    decoder: StreamDecoder,
    exhausted: bool,
}

impl<I> Iterator for Fragments<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(fragment) = self.decoder.next_fragment() {
                return Some(fragment);
            }
            if self.exhausted {
                return None;
            }
            match self.source.next() {
                Some(chunk) => self.decoder.push(chunk.as_ref()),
                None => {
                    self.decoder.finish();
                    self.exhausted = true;
                }
            }
        }
    }
}

impl<I> FusedIterator for Fragments<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
}
