#![no_main]
use libfuzzer_sys::fuzz_target;
use repe_stream::StreamDecoder;

fuzz_target!(|data: &[u8]| {
    // First byte picks the chunk size so arbitrary splits get exercised.
    let Some((&size, body)) = data.split_first() else {
        return;
    };
    let size = usize::from(size).max(1);

    let mut whole = StreamDecoder::new();
    whole.push(body);
    whole.finish();
    let expected: Vec<String> = whole.drain().collect();

    let mut chunked = StreamDecoder::new();
    let mut actual = Vec::new();
    for chunk in body.chunks(size) {
        chunked.push(chunk);
        actual.extend(chunked.drain());
    }
    chunked.finish();
    actual.extend(chunked.drain());

    assert_eq!(expected, actual);
});
