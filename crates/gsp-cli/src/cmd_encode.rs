/// Implementation of `gsp encode`.
///
/// Parses a JSON manifest and writes the matching protocol transcript
/// with `GspEncoder`. Useful for building fixtures and for replaying a
/// known result through `gsp decode`.
///
/// # Manifest format
///
/// ```json
/// {
///   "plan": ["1. Pick a name", "2. Write the code"],
///   "artifacts": [
///     { "path": "Hello/Hello.php", "content": "<?php ..." },
///     { "path": "Hello/config.xml", "content_file": "config.xml" }
///   ],
///   "message": "Module generation is complete."
/// }
/// ```
///
/// `content_file` may replace `content`; it is read relative to the
/// manifest's directory.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use gsp_encoder::GspEncoder;
use serde::Deserialize;

use crate::EncodeArgs;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    plan: Option<Vec<String>>,
    #[serde(default)]
    artifacts: Vec<ManifestArtifact>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ManifestArtifact {
    path: String,
    content: Option<String>,
    content_file: Option<String>,
}

/// Run the `gsp encode` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or parsed, an
/// artifact has neither `content` nor a readable `content_file`, or the
/// encoder rejects a field.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let manifest: Manifest = serde_json::from_str(&text)
        .with_context(|| format!("invalid manifest {}", args.input.display()))?;
    let base = args.input.parent().unwrap_or_else(|| Path::new("."));

    let mut encoder = GspEncoder::new();
    if let Some(plan) = &manifest.plan {
        encoder.plan(plan);
    }
    for artifact in &manifest.artifacts {
        let content = artifact_content(artifact, base)?;
        encoder.add_artifact(&artifact.path, &content);
    }
    if let Some(message) = &manifest.message {
        encoder.success(message);
    }

    let transcript = encoder.encode().context("cannot encode manifest")?;
    match &args.output {
        Some(path) => fs::write(path, transcript)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{transcript}"),
    }
    Ok(())
}

fn artifact_content(artifact: &ManifestArtifact, base: &Path) -> Result<String> {
    match (&artifact.content, &artifact.content_file) {
        (Some(content), _) => Ok(content.clone()),
        (None, Some(file)) => {
            let path = base.join(file);
            fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))
        }
        (None, None) => Err(anyhow!(
            "artifact {} has neither content nor content_file",
            artifact.path
        )),
    }
}
