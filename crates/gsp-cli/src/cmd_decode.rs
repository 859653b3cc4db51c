/// Implementation of `gsp decode`.
///
/// Replays a recorded transcript through the stream decoder, reading
/// `--chunk-size` bytes at a time so each read arrives as one fragment,
/// exactly as a live generation call would deliver it. Updates are merged
/// into a `ResultState` in arrival order.
///
/// # Output formats
///
/// ```text
/// ┌──────────┬──────────────────────────────────────────────────────────────┐
/// │ Format   │ Example                                                      │
/// ├──────────┼──────────────────────────────────────────────────────────────┤
/// │ json     │ {"plan": [...], "artifacts": {...}, "status": {...}}         │
/// │ summary  │ status: completed (Module generation is complete.)           │
/// │ updates  │ {"kind":"plan","steps":[...]}  (one line per update)         │
/// └──────────┴──────────────────────────────────────────────────────────────┘
/// ```
///
/// A decode that ends in a failed update exits with code 1 after the
/// output has been written.
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};
use futures::StreamExt;
use gsp_decoder::{DecoderConfig, StreamDecoder, TruncationPolicy, decode_reader_with};
use gsp_types::{Artifacts, ResultState, Status, Update};
use tokio::io::AsyncRead;
use tracing::info;

use crate::{DecodeArgs, OutputFormat, StreamArgs};

/// Run the `gsp decode` command.
///
/// # Errors
///
/// Returns an error if the transcript or seed file cannot be read, the
/// seed is not a JSON object of strings, or the decode ends in a failed
/// update.
pub async fn run(args: &DecodeArgs) -> Result<()> {
    let mut decoder = StreamDecoder::with_config(decoder_config(&args.stream));
    let mut state = ResultState::new();

    if let Some(seed_path) = &args.seed {
        let seed = read_seed(seed_path).await?;
        info!(artifacts = seed.len(), "seeding result with existing artifacts");
        decoder = decoder.with_artifacts(seed.clone());
        state = ResultState::with_artifacts(seed);
    }

    let reader = open_transcript(&args.stream.file).await?;
    let updates = decode_reader_with(decoder, reader);
    futures::pin_mut!(updates);

    while let Some(update) = updates.next().await {
        if args.format == OutputFormat::Updates {
            println!("{}", serde_json::to_string(&update)?);
        }
        state.apply(update);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
        OutputFormat::Summary => print!("{}", render_summary(&state)),
        OutputFormat::Updates => {}
    }

    if let Some(error) = state.error() {
        bail!("decode failed: {error}");
    }
    Ok(())
}

/// Build the decoder configuration from the shared stream flags.
pub(crate) fn decoder_config(args: &StreamArgs) -> DecoderConfig {
    DecoderConfig {
        truncation: if args.strict {
            TruncationPolicy::Fail
        } else {
            TruncationPolicy::Silent
        },
        read_chunk_size: args.chunk_size,
    }
}

/// Open a transcript file, or stdin for `-`.
pub(crate) async fn open_transcript(path: &Path) -> Result<Box<dyn AsyncRead + Unpin>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(Box::new(file))
}

async fn read_seed(path: &Path) -> Result<Artifacts> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON object of path → content", path.display()))
}

/// Render a result as plain text.
///
/// ```text
/// status: completed (Module generation is complete.)
/// plan: 2 steps
///   1. Pick a module name
///   2. Write the main file
/// artifacts: 1
///   Hello/Hello.php (24 bytes)
/// ```
pub(crate) fn render_summary(state: &ResultState) -> String {
    let mut out = String::new();
    let status = match &state.status {
        Status::InProgress => "incomplete (no terminal update)".to_string(),
        Status::Completed { message } => format!("completed ({message})"),
        Status::Failed { error } => format!("failed ({error})"),
    };
    let _ = writeln!(out, "status: {status}");

    let _ = writeln!(
        out,
        "plan: {} step{}",
        state.plan.len(),
        if state.plan.len() == 1 { "" } else { "s" }
    );
    for step in &state.plan {
        let _ = writeln!(out, "  {step}");
    }

    let _ = writeln!(out, "artifacts: {}", state.artifacts.len());
    for (path, content) in &state.artifacts {
        let _ = writeln!(out, "  {path} ({} bytes)", content.len());
    }
    out
}

/// Short description of an update, for validation output.
pub(crate) fn describe(update: &Update) -> String {
    match update {
        Update::Plan { steps } => format!("plan with {} steps", steps.len()),
        Update::Artifacts { artifacts } => format!("{} artifacts", artifacts.len()),
        Update::Completed { message } => format!("completed: {message}"),
        Update::Failed { error } => format!("failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_completed_result() {
        let state = ResultState::from_updates([
            Update::Plan {
                steps: vec!["1. x".into()],
            },
            Update::Artifacts {
                artifacts: [("a.php".to_string(), "<?php".to_string())].into_iter().collect(),
            },
            Update::Completed {
                message: "done".into(),
            },
        ]);
        assert_eq!(
            render_summary(&state),
            "status: completed (done)\nplan: 1 step\n  1. x\nartifacts: 1\n  a.php (5 bytes)\n"
        );
    }

    #[test]
    fn summary_of_truncated_result() {
        let state = ResultState::new();
        assert!(render_summary(&state).starts_with("status: incomplete"));
    }

    #[test]
    fn strict_flag_selects_fail_policy() {
        let args = StreamArgs {
            file: "-".into(),
            chunk_size: 7,
            strict: true,
        };
        let config = decoder_config(&args);
        assert_eq!(config.truncation, TruncationPolicy::Fail);
        assert_eq!(config.read_chunk_size, 7);
    }

    #[tokio::test]
    async fn seed_file_is_read_in_order() {
        let path = std::env::temp_dir().join(format!("gsp-seed-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{"b.php": "B", "a.php": "A"}"#)
            .await
            .unwrap();
        let seed = read_seed(&path).await;
        tokio::fs::remove_file(&path).await.unwrap();

        let seed = seed.unwrap();
        assert_eq!(seed.keys().collect::<Vec<_>>(), ["b.php", "a.php"]);
        assert_eq!(seed["a.php"], "A");
    }

    #[tokio::test]
    async fn seed_that_is_not_an_object_is_rejected() {
        let path = std::env::temp_dir().join(format!("gsp-bad-seed-{}.json", std::process::id()));
        tokio::fs::write(&path, "[1, 2]").await.unwrap();
        let err = read_seed(&path).await.unwrap_err();
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(err.to_string().contains("is not a JSON object"));
    }

    #[tokio::test]
    async fn missing_seed_file_names_the_path() {
        let err = read_seed(Path::new("/nonexistent/seed.json")).await.unwrap_err();
        assert!(err.to_string().contains("cannot read /nonexistent/seed.json"));
    }
}
