#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: feed arbitrary text to the stream decoder in one piece.
//
// Catches bugs in:
// - Opening marker scanning and partial-marker retention
// - Cursor arithmetic around multi-byte characters
// - Buffer draining at unit boundaries
fuzz_target!(|text: &str| {
    let mut decoder = gsp_decoder::StreamDecoder::new();
    let _ = decoder.feed(text);
    let _ = decoder.finish();
});
