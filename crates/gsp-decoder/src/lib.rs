#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod streaming;

mod utf8;

pub use config::{DecoderConfig, TruncationPolicy};
pub use decoder::{PendingUnit, StreamDecoder, decode_fragments};
pub use error::DecodeError;
pub use streaming::{decode_reader, decode_reader_with, decode_stream, decode_stream_with};
