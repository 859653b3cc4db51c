//! Edge cases for malformed, truncated, and oddly ordered streams.
//!
//! - **Malformed markers**: an unclosed tag never raises and never emits;
//!   it stays pending until the stream ends.
//! - **Truncation**: silent by default, reported as a failed update under
//!   the strict policy, and always visible through `pending()`.
//! - **Producer disorder**: units arriving out of the usual plan → code →
//!   success order still decode by whichever markers are present, and a
//!   unit left open stalls only its own kind.
//! - **After the terminal update**: later input is ignored.

use futures::{StreamExt, stream};
use gsp_decoder::{
    DecoderConfig, PendingUnit, StreamDecoder, TruncationPolicy, decode_fragments, decode_stream,
};
use gsp_tests::{char_fragments, decode_all, decode_to_state, module_transcript};
use gsp_types::{ResultState, Status, Update};

fn strict() -> DecoderConfig {
    DecoderConfig {
        truncation: TruncationPolicy::Fail,
        ..DecoderConfig::default()
    }
}

// ── Malformed markers ─────────────────────────────────────────────────────────

#[test]
fn unclosed_code_tag_stays_pending() {
    let mut decoder = StreamDecoder::new();
    assert!(decoder.feed("[CODE_START:never/closed.php").is_empty());
    assert!(decoder.feed(" more text with no bracket").is_empty());
    assert_eq!(decoder.pending(), Some(PendingUnit::CodeTag));
    assert!(decoder.finish().is_ok());
}

#[test]
fn unclosed_tag_swallows_the_rest_of_the_stream() {
    // The path runs to the first `]`, wherever it is.
    let updates = decode_all(&["[CODE_START:a.php\n<?php $x = [1];[CODE_END]"]);
    assert_eq!(
        updates,
        vec![Update::Artifacts {
            artifacts: [("a.php\n<?php $x = [1".to_string(), ";".to_string())]
                .into_iter()
                .collect(),
        }]
    );
}

#[test]
fn near_miss_markers_are_inert() {
    let updates = decode_all(&["[PLAN_STAR] [CODE_START [SUCCESS ] [code_end]"]);
    assert!(updates.is_empty());
}

// ── Truncation ────────────────────────────────────────────────────────────────

#[test]
fn truncated_transcript_keeps_complete_units_only() {
    let text = module_transcript();
    let cut = text.find("[CODE_END]").expect("fixture has a code block") - 3;
    let state = decode_to_state(&char_fragments(&text[..cut]));

    assert_eq!(state.plan.len(), 4);
    assert!(state.artifacts.is_empty());
    assert_eq!(state.status, Status::InProgress);
}

#[test]
fn strict_policy_names_the_open_plan() {
    let updates = decode_fragments(["[PLAN_START]1. x\n2. y"], strict());
    assert_eq!(
        updates,
        vec![Update::Failed {
            error: "stream ended inside an unterminated plan block".into()
        }]
    );
}

#[test]
fn strict_policy_names_the_open_success_marker() {
    let updates = decode_fragments(["[SUCCESS:almost"], strict());
    assert_eq!(
        updates,
        vec![Update::Failed {
            error: "stream ended inside an unterminated success marker".into()
        }]
    );
}

#[test]
fn strict_policy_accepts_a_completed_stream() {
    let text = module_transcript();
    let updates = decode_fragments(char_fragments(&text), strict());
    assert!(matches!(updates.last(), Some(Update::Completed { .. })));
}

#[tokio::test]
async fn strict_policy_on_empty_source() {
    let source = stream::iter(Vec::<Result<String, String>>::new());
    let updates: Vec<Update> = decode_stream(source, strict()).collect().await;
    assert_eq!(
        updates,
        vec![Update::Failed {
            error: "stream ended without a success marker".into()
        }]
    );
}

#[tokio::test]
async fn silent_policy_on_empty_source() {
    let source = stream::iter(Vec::<Result<String, String>>::new());
    let updates: Vec<Update> = decode_stream(source, DecoderConfig::default()).collect().await;
    assert!(updates.is_empty());
}

// ── Producer disorder ─────────────────────────────────────────────────────────

#[test]
fn code_before_plan() {
    let text = "[CODE_START:a]A[CODE_END][PLAN_START]1. late[PLAN_END][SUCCESS:ok]";
    let whole = decode_to_state(&[text]);
    assert_eq!(whole.plan, vec!["1. late"]);
    assert_eq!(whole.artifacts["a"], "A");
    assert_eq!(
        whole.status,
        Status::Completed {
            message: "ok".into()
        }
    );
    assert_eq!(decode_to_state(&char_fragments(text)), whole);
}

#[test]
fn success_before_code_ends_the_decode() {
    let updates = decode_all(&["[SUCCESS:early]", "[CODE_START:a]A[CODE_END]"]);
    assert_eq!(
        updates,
        vec![Update::Completed {
            message: "early".into()
        }]
    );
}

#[test]
fn missing_plan_end_does_not_block_code_or_success() {
    let text = "[PLAN_START]1. x\n[CODE_START:a.php]X[CODE_END][SUCCESS:done]";
    for updates in [decode_all(&[text]), decode_all(&char_fragments(text))] {
        let kinds: Vec<_> = updates.iter().map(Update::kind).collect();
        assert_eq!(kinds, ["artifacts", "completed"]);
        let state = ResultState::from_updates(updates);
        assert!(state.plan.is_empty());
        assert_eq!(state.artifacts["a.php"], "X");
    }
}

#[test]
fn code_tag_without_bracket_does_not_block_success() {
    let text = "[CODE_START:a.php [SUCCESS:done]";
    for updates in [decode_all(&[text]), decode_all(&char_fragments(text))] {
        assert_eq!(
            updates,
            vec![Update::Completed {
                message: "done".into()
            }]
        );
    }
}

#[test]
fn unclosed_plan_is_still_pending_while_code_resolves() {
    let mut decoder = StreamDecoder::new();
    let updates = decoder.feed("[PLAN_START]1. x\n[CODE_START:a.php]X[CODE_END]");
    assert_eq!(updates.len(), 1);
    assert_eq!(decoder.pending(), Some(PendingUnit::Plan));
}

#[test]
fn plan_markers_inside_code_do_not_open_a_plan() {
    let state = decode_to_state(&[
        "[CODE_START:README.md]Use [PLAN_START] to begin[CODE_END]",
        "[PLAN_START]1. real[PLAN_END]",
    ]);
    assert_eq!(state.plan, vec!["1. real"]);
    assert_eq!(state.artifacts["README.md"], "Use [PLAN_START] to begin");
}

// ── After the terminal update ─────────────────────────────────────────────────

#[tokio::test]
async fn fragments_after_success_are_ignored() {
    let source = stream::iter(vec![
        Ok::<_, String>("[SUCCESS:done]"),
        Ok("[CODE_START:late.php]x[CODE_END]"),
    ]);
    let mut decoder = StreamDecoder::new();
    let mut updates = Vec::new();
    let mut source = Box::pin(source);
    while let Some(Ok(fragment)) = source.next().await {
        updates.extend(decoder.feed(fragment));
    }
    assert_eq!(updates.len(), 1);
    assert!(decoder.artifacts().is_empty());
}
