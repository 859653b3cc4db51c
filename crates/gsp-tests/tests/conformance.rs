//! Conformance tests: decoded results rendered to inline insta snapshots.
//!
//! The snapshots pin the serialized shape of `ResultState` and `Update`
//! (what `gsp decode --format json|updates` prints) and the exact text
//! `GspEncoder` writes. A diff signals either a deliberate format change
//! (accept via `cargo insta review`) or an accidental regression.

use gsp_encoder::GspEncoder;
use gsp_tests::{char_fragments, decode_all, decode_to_state};
use insta::assert_snapshot;

fn small_transcript() -> String {
    GspEncoder::new()
        .plan(["1. Name the module Hello", "2. Write Hello.php"])
        .add_artifact("Hello/Hello.php", "<?php\nclass Hello extends Module {}")
        .add_artifact("Hello/config.xml", "<module/>")
        .success("Module generation is complete.")
        .encode()
        .unwrap()
}

#[test]
fn encoder_output() {
    assert_snapshot!(small_transcript(), @r"
    [PLAN_START]
    1. Name the module Hello
    2. Write Hello.php
    [PLAN_END]

    [CODE_START:Hello/Hello.php]
    <?php
    class Hello extends Module {}
    [CODE_END]

    [CODE_START:Hello/config.xml]
    <module/>
    [CODE_END]

    [SUCCESS:Module generation is complete.]
    ");
}

#[test]
fn result_state_json() {
    let text = small_transcript();
    let state = decode_to_state(&char_fragments(&text));
    let json = serde_json::to_string_pretty(&state).unwrap();
    assert_snapshot!(json, @r#"
    {
      "plan": [
        "1. Name the module Hello",
        "2. Write Hello.php"
      ],
      "artifacts": {
        "Hello/Hello.php": "<?php\nclass Hello extends Module {}",
        "Hello/config.xml": "<module/>"
      },
      "status": {
        "state": "completed",
        "message": "Module generation is complete."
      }
    }
    "#);
}

#[test]
fn update_sequence_ndjson() {
    let text = small_transcript();
    let lines: Vec<String> = decode_all(&[text.as_str()])
        .iter()
        .map(|u| serde_json::to_string(u).unwrap())
        .collect();
    assert_snapshot!(lines.join("\n"), @r#"
    {"kind":"plan","steps":["1. Name the module Hello","2. Write Hello.php"]}
    {"kind":"artifacts","artifacts":{"Hello/Hello.php":"<?php\nclass Hello extends Module {}"}}
    {"kind":"artifacts","artifacts":{"Hello/Hello.php":"<?php\nclass Hello extends Module {}","Hello/config.xml":"<module/>"}}
    {"kind":"completed","message":"Module generation is complete."}
    "#);
}
