/// Default number of bytes requested per read by
/// [`decode_reader`](crate::decode_reader).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Configuration for a [`StreamDecoder`](crate::StreamDecoder) and the
/// stream adapters built on it.
///
/// ```text
/// ┌─────────────────┬───────────────────────────────────────────────────┐
/// │ Field           │ Purpose                                           │
/// ├─────────────────┼───────────────────────────────────────────────────┤
/// │ truncation      │ What to do when the source ends before a terminal │
/// │                 │ update: stay silent (default) or emit Failed      │
/// │ read_chunk_size │ Bytes per read when decoding an `AsyncRead`       │
/// └─────────────────┴───────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub truncation: TruncationPolicy,
    pub read_chunk_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            truncation: TruncationPolicy::default(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Behaviour when the fragment source ends cleanly but no terminal update
/// was produced.
///
/// ```text
/// ┌────────┬──────────────────────────────────────────────────────────┐
/// │ Policy │ End of stream without [SUCCESS:...]                      │
/// ├────────┼──────────────────────────────────────────────────────────┤
/// │ Silent │ No update. Callers detect truncation by the absence of a │
/// │        │ terminal update (or via `StreamDecoder::pending`).       │
/// │ Fail   │ One `Update::Failed` naming the unit left open.          │
/// └────────┴──────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    #[default]
    Silent,
    Fail,
}
