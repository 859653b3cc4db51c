use std::fmt::Display;

use async_stream::stream;
use futures::{Stream, StreamExt};
use gsp_types::Update;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::config::DecoderConfig;
use crate::decoder::StreamDecoder;
use crate::error::DecodeError;
use crate::utf8::Utf8Assembler;

/// Decode an asynchronous fragment source into a lazy update stream.
///
/// This is the primary API for a live generation call. Each item of
/// `source` is one fragment (or the error that ended the call); the
/// returned stream yields updates as soon as the fragment that completes
/// their unit arrives. Backpressure is natural: the source is only
/// polled when the caller awaits the next update.
///
/// ```text
///   source:  "[PLAN_ST"  "ART]1. x[PLAN_END][CODE_"  "START:a]A[CODE_END]"  Err(..)
///   updates:             Plan                        Artifacts              Failed
/// ```
///
/// The stream ends after the first terminal update, or when the source
/// ends. A source error produces exactly one [`Update::Failed`] and the
/// source is not polled again. Dropping the stream cancels the decode;
/// there is nothing to clean up.
///
/// # Example
///
/// ```rust
/// use futures::{StreamExt, stream};
/// use gsp_decoder::{DecoderConfig, decode_stream};
/// use gsp_types::ResultState;
///
/// # futures::executor::block_on(async {
/// let source = stream::iter(["[SUCCESS:", "done]"].map(Ok::<_, std::io::Error>));
/// let updates = decode_stream(source, DecoderConfig::default());
/// futures::pin_mut!(updates);
///
/// let mut state = ResultState::new();
/// while let Some(update) = updates.next().await {
///     state.apply(update);
/// }
/// assert_eq!(state.completion_message(), Some("done"));
/// # });
/// ```
pub fn decode_stream<S, T, E>(source: S, config: DecoderConfig) -> impl Stream<Item = Update>
where
    S: Stream<Item = Result<T, E>>,
    T: AsRef<str>,
    E: Display,
{
    decode_stream_with(StreamDecoder::with_config(config), source)
}

/// Like [`decode_stream`], driving a caller-prepared decoder (for
/// example one seeded with [`StreamDecoder::with_artifacts`]).
pub fn decode_stream_with<S, T, E>(
    mut decoder: StreamDecoder,
    source: S,
) -> impl Stream<Item = Update>
where
    S: Stream<Item = Result<T, E>>,
    T: AsRef<str>,
    E: Display,
{
    stream! {
        let mut source = std::pin::pin!(source);
        while let Some(item) = source.next().await {
            match item {
                Ok(fragment) => {
                    for update in decoder.feed(fragment.as_ref()) {
                        yield update;
                    }
                    if decoder.is_finished() {
                        debug!("terminal update reached, no longer polling source");
                        return;
                    }
                }
                Err(error) => {
                    let error = DecodeError::Transport(error.to_string());
                    if let Some(update) = decoder.fail(&error) {
                        yield update;
                    }
                    return;
                }
            }
        }

        if let Err(error) = decoder.finish() {
            if let Some(update) = decoder.fail(&error) {
                yield update;
            }
        }
    }
}

/// Decode text read from an async byte source.
///
/// Reads `config.read_chunk_size` bytes at a time and feeds each read to
/// the decoder as one fragment. A multi-byte character split between two
/// reads is reassembled before decoding; invalid UTF-8 or an I/O error
/// ends the decode with a failure update.
pub fn decode_reader<R>(reader: R, config: DecoderConfig) -> impl Stream<Item = Update>
where
    R: AsyncRead + Unpin,
{
    decode_reader_with(StreamDecoder::with_config(config), reader)
}

/// Like [`decode_reader`], driving a caller-prepared decoder. The read
/// size comes from the decoder's configuration.
pub fn decode_reader_with<R>(decoder: StreamDecoder, reader: R) -> impl Stream<Item = Update>
where
    R: AsyncRead + Unpin,
{
    let chunk_size = decoder.config().read_chunk_size;
    decode_stream_with(decoder, read_fragments(reader, chunk_size))
}

fn read_fragments<R>(
    mut reader: R,
    chunk_size: usize,
) -> impl Stream<Item = Result<String, DecodeError>>
where
    R: AsyncRead + Unpin,
{
    stream! {
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut assembler = Utf8Assembler::default();
        loop {
            let n = match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    yield Err(DecodeError::Io(e));
                    return;
                }
            };
            let (text, error) = assembler.push(&buf[..n]);
            if !text.is_empty() {
                yield Ok(text);
            }
            if let Some(e) = error {
                yield Err(e);
                return;
            }
        }
        if let Err(e) = assembler.finish() {
            yield Err(e);
        }
    }
}
