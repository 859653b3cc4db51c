/// Errors that can occur while writing protocol text.
///
/// The encoder refuses input that the decoder could not read back
/// unchanged under every fragmentation: a delimiter inside a field would
/// close its unit early, a marker inside a field could be resolved as a
/// unit of its own while the field is still streaming, and a blank plan
/// step would be dropped.
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── EmptyPayload      ← nothing was added before .encode()
///   ├── InvalidStep       ← plan step is blank, multi-line, or holds a marker
///   ├── InvalidPath       ← artifact path is empty, holds ']', or holds a marker
///   ├── InvalidContent    ← artifact content holds a marker
///   ├── DuplicatePath     ← the same path was added twice
///   └── InvalidMessage    ← success message holds ']' or a marker
/// ```
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("nothing has been added to the encoder")]
    EmptyPayload,

    #[error("plan step {index} cannot be encoded: {reason}")]
    InvalidStep { index: usize, reason: &'static str },

    #[error("artifact path {path:?} cannot be encoded: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("content of artifact {path:?} contains the marker {marker}")]
    InvalidContent { path: String, marker: &'static str },

    #[error("artifact {path:?} was added more than once")]
    DuplicatePath { path: String },

    #[error("success message cannot be encoded: {reason}")]
    InvalidMessage { reason: &'static str },
}
