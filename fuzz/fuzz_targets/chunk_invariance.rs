#![no_main]

use arbitrary::Arbitrary;
use gsp_decoder::{decode_fragments, DecoderConfig};
use gsp_encoder::GspEncoder;
use gsp_types::ResultState;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    steps: Option<Vec<String>>,
    artifacts: Vec<(String, String)>,
    message: Option<String>,
    cuts: Vec<u16>,
}

// Fuzz target: a transcript the encoder accepts decodes to the same
// result however it is split into fragments.
//
// Units may resolve in a different order when a later unit closes first,
// so the merged result is compared rather than the update sequence.
fuzz_target!(|input: FuzzInput| {
    let mut encoder = GspEncoder::new();
    if let Some(steps) = &input.steps {
        encoder.plan(steps);
    }
    for (path, content) in &input.artifacts {
        encoder.add_artifact(path, content);
    }
    if let Some(message) = &input.message {
        encoder.success(message);
    }
    let Ok(text) = encoder.encode() else {
        return;
    };

    let mut cuts: Vec<usize> = input
        .cuts
        .iter()
        .map(|&c| {
            let mut cut = usize::from(c).min(text.len());
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            cut
        })
        .collect();
    cuts.sort_unstable();

    let mut fragments = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        fragments.push(&text[start..cut]);
        start = cut;
    }
    fragments.push(&text[start..]);

    let whole = decode_fragments([text.as_str()], DecoderConfig::default());
    let split = decode_fragments(fragments, DecoderConfig::default());
    assert_eq!(
        ResultState::from_updates(whole),
        ResultState::from_updates(split)
    );
});
