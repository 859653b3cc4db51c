/// GSP command-line tool. Decodes, validates, and produces generation
/// stream protocol transcripts.
///
/// # Command overview
///
/// ```text
/// gsp <COMMAND> [OPTIONS]
///
/// Commands:
///   decode     Decode a recorded transcript into a result
///   validate   Check that a transcript decodes to a completed result
///   encode     Write a transcript from a JSON manifest
///   prompt     Print the generation instruction for a request
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder activity to stderr (repeat for trace)
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                          |
/// |------|--------------------------------------------------|
/// | 0    | Success                                          |
/// | 1    | Error (I/O failure, failed or truncated decode)  |
///
/// All error details and logs are written to stderr so stdout can be
/// piped cleanly. `RUST_LOG` overrides the `-v` log level.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod cmd_decode;
mod cmd_encode;
mod cmd_prompt;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The GSP (Generation Stream Protocol) command-line tool.
#[derive(Parser)]
#[command(name = "gsp", version, about = "Generation Stream Protocol CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder activity to stderr. Repeat (`-vv`) for per-fragment
    /// tracing.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Decode a recorded transcript into a result.
    Decode(DecodeArgs),
    /// Check that a transcript decodes to a completed result.
    Validate(ValidateArgs),
    /// Write a transcript from a JSON manifest.
    Encode(EncodeArgs),
    /// Print the generation instruction for a request.
    Prompt(PromptArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Options shared by the commands that run the decoder.
///
/// ```text
/// ┌──────────────┬─────────────────────────────────────────────────────────┐
/// │ Flag         │ Effect                                                  │
/// ├──────────────┼─────────────────────────────────────────────────────────┤
/// │ --chunk-size │ Bytes per read; small values replay a slow stream       │
/// │ --strict     │ Emit a failed update when the transcript is truncated   │
/// └──────────────┴─────────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct StreamArgs {
    /// Transcript file to read, or `-` for stdin.
    pub file: PathBuf,

    /// Bytes per read fed to the decoder as one fragment.
    #[arg(long, default_value_t = gsp_decoder::config::DEFAULT_READ_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Treat a transcript that ends without a success marker as failed.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `gsp decode`.
///
/// ```text
/// ┌──────────┬────────────────────────────────────────────────────────────┐
/// │ Format   │ Output                                                     │
/// ├──────────┼────────────────────────────────────────────────────────────┤
/// │ json     │ Merged result as pretty JSON (default)                     │
/// │ summary  │ Status, plan steps, and artifact sizes as plain text       │
/// │ updates  │ Every update as one JSON line, printed as it is decoded    │
/// └──────────┴────────────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub stream: StreamArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// JSON file of existing artifacts (`{"path": "content", ...}`) to seed
    /// the result with, as when modifying a previous generation.
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Summary,
    Updates,
}

/// Arguments for `gsp validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub stream: StreamArgs,
}

/// Arguments for `gsp encode`.
///
/// The manifest format is:
///
/// ```json
/// {
///   "plan": ["1. Pick a name", "2. Write the code"],
///   "artifacts": [
///     { "path": "Hello/Hello.php", "content": "<?php ..." }
///   ],
///   "message": "Module generation is complete."
/// }
/// ```
///
/// Every key is optional, but at least one must be present.
#[derive(clap::Args)]
pub struct EncodeArgs {
    /// Path to the JSON manifest.
    pub input: PathBuf,

    /// Output transcript path. Prints to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `gsp prompt`.
#[derive(clap::Args)]
pub struct PromptArgs {
    /// What the user asked for.
    pub description: String,

    /// Artifact paths of an existing generation to modify. Switches the
    /// prompt to modify mode.
    #[arg(long = "existing", value_name = "PATH")]
    pub existing: Vec<String>,

    /// Description the existing generation was created from.
    #[arg(long, requires = "existing")]
    pub original: Option<String>,

    /// Expertise the model is asked to assume.
    #[arg(long)]
    pub domain: Option<String>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Decode(args) => cmd_decode::run(&args).await,
        Commands::Validate(args) => cmd_validate::run(&args).await,
        Commands::Encode(args) => cmd_encode::run(&args),
        Commands::Prompt(args) => {
            cmd_prompt::run(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
