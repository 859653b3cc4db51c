#![no_main]

use arbitrary::Arbitrary;
use gsp_decoder::StreamDecoder;
use gsp_encoder::GspEncoder;
use gsp_types::{ResultState, Status};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    steps: Option<Vec<String>>,
    artifacts: Vec<(String, String)>,
    message: Option<String>,
}

// Fuzz target: whatever the encoder accepts, the decoder reads back.
//
// Content, steps and the message come back trimmed; paths verbatim.
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

    let mut decoder = StreamDecoder::new();
    let state = ResultState::from_updates(decoder.feed(&text));

    let expected_plan: Vec<String> = input
        .steps
        .iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .collect();
    assert_eq!(state.plan, expected_plan);

    assert_eq!(state.artifacts.len(), input.artifacts.len());
    for (path, content) in &input.artifacts {
        assert_eq!(state.artifacts[path.as_str()], content.trim());
    }

    match &input.message {
        Some(message) => assert_eq!(
            state.status,
            Status::Completed {
                message: message.trim().to_string()
            }
        ),
        None => assert_eq!(state.status, Status::InProgress),
    }
});
