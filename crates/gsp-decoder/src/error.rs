use crate::decoder::PendingUnit;

/// Errors that end a decode.
///
/// The decoder itself never fails on malformed protocol text: a marker
/// it cannot close simply stays pending. These variants describe the
/// conditions that do end a decode, and every one of them reaches the
/// caller as a single terminal [`Update::Failed`](gsp_types::Update)
/// carrying the error's display text.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── Transport(String)      ← the fragment source itself failed
///   ├── InvalidUtf8            ← byte source produced non-UTF-8 text
///   ├── Truncated              ← source ended with a unit open (strict policy)
///   ├── MissingTerminal        ← source ended without [SUCCESS:] (strict policy)
///   └── Io(std::io::Error)     ← from the underlying async reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The generation call or its transport reported an error.
    ///
    /// Carries the source's own display text. The decoder does not retry;
    /// a new decode with a fresh decoder is the caller's decision.
    #[error("generation stream failed: {0}")]
    Transport(String),

    /// A byte source produced a sequence that is not valid UTF-8.
    ///
    /// Multi-byte characters split across reads are reassembled first, so
    /// this only fires on genuinely invalid input.
    #[error("invalid UTF-8 in generation stream at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// The source ended while a unit was still open.
    ///
    /// Only produced under [`TruncationPolicy::Fail`](crate::TruncationPolicy).
    #[error("stream ended {pending}")]
    Truncated { pending: PendingUnit },

    /// The source ended between units but no success marker was ever seen.
    ///
    /// Only produced under [`TruncationPolicy::Fail`](crate::TruncationPolicy).
    #[error("stream ended without a success marker")]
    MissingTerminal,

    /// An I/O error from the underlying reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
