/// Implementation of `gsp validate`.
///
/// Replays a transcript through the decoder with the strict truncation
/// policy and reports every update it produced. The command exits with
/// code 0 only when the transcript reaches a success marker; a truncated
/// transcript is reported with the unit that was left open.
///
/// # Success output
///
/// ```text
/// ✓ plan with 3 steps
/// ✓ 1 artifacts
/// ✓ 2 artifacts
/// ✓ completed: Module generation is complete.
/// ```
///
/// # Failure output
///
/// ```text
/// ✓ plan with 3 steps
/// ✗ failed: stream ended inside an unterminated code block for `Mod/config.xml`
/// ```
use anyhow::{Result, anyhow};
use futures::StreamExt;
use gsp_decoder::{DecoderConfig, TruncationPolicy, decode_reader};
use gsp_types::Update;

use crate::ValidateArgs;
use crate::cmd_decode::{decoder_config, describe, open_transcript};

/// Run the `gsp validate` command.
///
/// # Errors
///
/// Returns an error if the transcript cannot be read or does not decode
/// to a completed result.
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let config = DecoderConfig {
        truncation: TruncationPolicy::Fail,
        ..decoder_config(&args.stream)
    };
    let reader = open_transcript(&args.stream.file).await?;
    let updates = decode_reader(reader, config);
    futures::pin_mut!(updates);

    let mut completed = false;
    while let Some(update) = updates.next().await {
        let mark = if matches!(update, Update::Failed { .. }) { '✗' } else { '✓' };
        println!("{mark} {}", describe(&update));
        completed |= matches!(update, Update::Completed { .. });
    }

    if completed {
        Ok(())
    } else {
        Err(anyhow!("validation failed"))
    }
}
