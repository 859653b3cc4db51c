use std::fmt;

use gsp_types::markers::{CODE_END, CODE_START, PLAN_END, PLAN_START, SUCCESS, TAG_CLOSE};
use gsp_types::{Artifacts, Update};
use tracing::{debug, trace, warn};

use crate::config::{DecoderConfig, TruncationPolicy};
use crate::error::DecodeError;

/// Bytes kept in front of an open unit's opener. A marker formed across
/// the gap left by a removed unit can begin at most this far back.
const MARKER_MARGIN: usize = CODE_START.len() - 1;

/// Incremental decoder for the generation stream protocol.
///
/// Text arrives in fragments whose boundaries carry no meaning: a
/// fragment may end in the middle of a marker, a path, or a code body.
/// [`feed`](Self::feed) appends each fragment to an internal buffer and
/// then runs three extraction passes over it (plan, code, success) until
/// none of them resolves another unit. Each pass looks for its own
/// markers wherever they are in the buffer, so a unit that never closes
/// only stalls its own pass:
///
/// ```text
///   plan     Searching ──[PLAN_START]──▶ Open ──[PLAN_END]──▶ Done         → Update::Plan
///   code     Searching ──[CODE_START:──▶ Tag ──]──▶ Body ──[CODE_END]──┐   → Update::Artifacts
///                ▲─────────────────────────────────────────────────────┘
///   success  Searching ──[SUCCESS:─────▶ Open ──]──▶ (finished)           → Update::Completed
/// ```
///
/// A resolved unit is removed from the buffer; anything still open stays
/// buffered until a later fragment closes it. Nothing is ever emitted
/// from a unit that has not been seen in full.
///
/// One decoder serves exactly one generation call. It performs no I/O and
/// never blocks; the async adapters in [`streaming`](crate::streaming)
/// drive it from a fragment source.
///
/// # Example
///
/// ```rust
/// use gsp_decoder::StreamDecoder;
/// use gsp_types::Update;
///
/// let mut decoder = StreamDecoder::new();
/// assert!(decoder.feed("[CODE_START:a.php]<?php ").is_empty());
/// let updates = decoder.feed("echo 1;[CODE_END]");
/// assert!(matches!(
///     &updates[..],
///     [Update::Artifacts { artifacts }] if artifacts["a.php"] == "<?php echo 1;"
/// ));
/// ```
#[derive(Debug)]
pub struct StreamDecoder {
    /// Input not yet consumed by a resolved unit. Open units and the text
    /// between them stay here until they close.
    buf: String,
    plan: PlanPass,
    code: CodePass,
    success: SuccessPass,
    finished: bool,
    /// Every artifact resolved so far; cloned into each artifact update.
    artifacts: Artifacts,
    config: DecoderConfig,
    received: usize,
}

// ── Pass state ──────────────────────────────────────────────────────────
//
// Every `from` is a resume cursor: the marker that pass is waiting for
// does not begin anywhere in `buf` between the pass's lower bound and
// `from`. `start` is the buffer offset of the pass's opening marker.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlanPass {
    Searching { from: usize },
    Open { start: usize, from: usize },
    /// Resolved. The plan is emitted once; later `[PLAN_START]` is inert.
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CodePass {
    Searching { from: usize },
    /// `[CODE_START:` seen, the `]` ending the path not yet.
    Tag { start: usize, from: usize },
    /// Path ends at the `]` at `close`; waiting for `[CODE_END]`.
    Body { start: usize, close: usize, from: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SuccessPass {
    Searching { from: usize },
    Open { start: usize, from: usize },
}

/// A byte range drained from the buffer.
#[derive(Clone, Copy, Debug)]
struct Span {
    start: usize,
    end: usize,
}

impl Span {
    fn len(self) -> usize {
        self.end - self.start
    }

    /// Resume cursor for `needle` after this span is removed.
    ///
    /// Text left of the span is unchanged, but a new match may now
    /// straddle the join, so a cursor past it moves back to the first
    /// position such a match could start.
    fn retreat(self, from: usize, needle: &str) -> usize {
        let reach = needle.len() - 1;
        if from + reach <= self.start {
            from
        } else {
            self.start.saturating_sub(reach)
        }
    }
}

impl PlanPass {
    /// First buffer offset this pass still depends on.
    ///
    /// An open unit keeps a margin in front of its opener: removing a
    /// unit inside it can join text on either side into a new marker.
    fn anchor(self) -> Option<usize> {
        match self {
            Self::Searching { from } => Some(from),
            Self::Open { start, .. } => Some(start.saturating_sub(MARKER_MARGIN)),
            Self::Done => None,
        }
    }

    fn shifted(self, by: usize) -> Self {
        match self {
            Self::Searching { from } => Self::Searching { from: from - by },
            Self::Open { start, from } => Self::Open {
                start: start - by,
                from: from - by,
            },
            Self::Done => Self::Done,
        }
    }

    fn rebased(self, span: Span) -> Self {
        match self {
            Self::Done => Self::Done,
            Self::Searching { from } => Self::Searching {
                from: span.retreat(from, PLAN_START),
            },
            Self::Open { start, .. } if start >= span.end => self.shifted(span.len()),
            Self::Open { start, .. } if start >= span.start => Self::Searching {
                from: span.retreat(start, PLAN_START),
            },
            Self::Open { start, from } => Self::Open {
                start,
                from: span.retreat(from, PLAN_END).max(start + PLAN_START.len()),
            },
        }
    }
}

impl CodePass {
    fn anchor(self) -> usize {
        match self {
            Self::Searching { from } => from,
            Self::Tag { start, .. } | Self::Body { start, .. } => {
                start.saturating_sub(MARKER_MARGIN)
            }
        }
    }

    fn shifted(self, by: usize) -> Self {
        match self {
            Self::Searching { from } => Self::Searching { from: from - by },
            Self::Tag { start, from } => Self::Tag {
                start: start - by,
                from: from - by,
            },
            Self::Body { start, close, from } => Self::Body {
                start: start - by,
                close: close - by,
                from: from - by,
            },
        }
    }

    fn rebased(self, span: Span) -> Self {
        match self {
            Self::Searching { from } => Self::Searching {
                from: span.retreat(from, CODE_START),
            },
            Self::Tag { start, .. } | Self::Body { start, .. } if start >= span.end => {
                self.shifted(span.len())
            }
            Self::Tag { start, .. } | Self::Body { start, .. } if start >= span.start => {
                Self::Searching {
                    from: span.retreat(start, CODE_START),
                }
            }
            Self::Tag { start, from } => Self::Tag {
                start,
                from: span.retreat(from, TAG_CLOSE).max(start + CODE_START.len()),
            },
            Self::Body { start, close, from } if close < span.start => Self::Body {
                start,
                close,
                from: span.retreat(from, CODE_END).max(close + TAG_CLOSE.len()),
            },
            // The `]` that ended the path belonged to the removed unit.
            Self::Body { start, .. } => Self::Tag {
                start,
                from: span.start.max(start + CODE_START.len()),
            },
        }
    }
}

impl SuccessPass {
    fn anchor(self) -> usize {
        match self {
            Self::Searching { from } => from,
            Self::Open { start, .. } => start.saturating_sub(MARKER_MARGIN),
        }
    }

    fn shifted(self, by: usize) -> Self {
        match self {
            Self::Searching { from } => Self::Searching { from: from - by },
            Self::Open { start, from } => Self::Open {
                start: start - by,
                from: from - by,
            },
        }
    }

    fn rebased(self, span: Span) -> Self {
        match self {
            Self::Searching { from } => Self::Searching {
                from: span.retreat(from, SUCCESS),
            },
            Self::Open { start, .. } if start >= span.end => self.shifted(span.len()),
            Self::Open { start, .. } if start >= span.start => Self::Searching {
                from: span.retreat(start, SUCCESS),
            },
            Self::Open { start, from } => Self::Open {
                start,
                from: span.retreat(from, TAG_CLOSE).max(start + SUCCESS.len()),
            },
        }
    }
}

/// A unit that was opened but not closed when the input stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingUnit {
    /// `[PLAN_START]` seen, `[PLAN_END]` not yet.
    Plan,
    /// `[CODE_START:` seen, the `]` ending the path not yet.
    CodeTag,
    /// Code block for `path` opened, `[CODE_END]` not yet.
    Code { path: String },
    /// `[SUCCESS:` seen, the `]` ending the message not yet.
    Success,
}

impl fmt::Display for PendingUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plan => f.write_str("inside an unterminated plan block"),
            Self::CodeTag => f.write_str("inside an unterminated code block tag"),
            Self::Code { path } => write!(f, "inside an unterminated code block for `{path}`"),
            Self::Success => f.write_str("inside an unterminated success marker"),
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    /// Create a decoder with the default configuration and no artifacts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            buf: String::new(),
            plan: PlanPass::Searching { from: 0 },
            code: CodePass::Searching { from: 0 },
            success: SuccessPass::Searching { from: 0 },
            finished: false,
            artifacts: Artifacts::new(),
            config,
            received: 0,
        }
    }

    /// Seed the artifact map with previously generated artifacts.
    ///
    /// Used when a generation call modifies an existing artifact set: every
    /// snapshot then carries the seeded entries alongside the newly
    /// resolved ones, and a re-emitted path overwrites its seeded content.
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Artifacts) -> Self {
        self.artifacts = artifacts;
        self
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Artifacts resolved so far, including any seeded ones.
    #[must_use]
    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Whether a terminal update has been produced.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The earliest unit still open, if any.
    ///
    /// Several units can be open at once when a producer leaves one
    /// unclosed; the one that opened first in the stream is reported. A
    /// partial opening marker at the end of the buffer (e.g. `[CODE_ST`)
    /// does not count: until it completes it is indistinguishable from
    /// inert text.
    #[must_use]
    pub fn pending(&self) -> Option<PendingUnit> {
        if self.finished {
            return None;
        }

        let mut open = Vec::with_capacity(3);
        if let PlanPass::Open { start, .. } = self.plan {
            open.push((start, PendingUnit::Plan));
        }
        match self.code {
            CodePass::Searching { .. } => {}
            CodePass::Tag { start, .. } => open.push((start, PendingUnit::CodeTag)),
            CodePass::Body { start, close, .. } => open.push((
                start,
                PendingUnit::Code {
                    path: self.buf[start + CODE_START.len()..close].to_string(),
                },
            )),
        }
        if let SuccessPass::Open { start, .. } = self.success {
            open.push((start, PendingUnit::Success));
        }

        open.into_iter()
            .min_by_key(|(start, _)| *start)
            .map(|(_, unit)| unit)
    }

    /// Append one fragment and resolve every unit it completes.
    ///
    /// Passes run in the order plan, code, success, and repeat while any
    /// of them resolves a unit, so several units may resolve from one
    /// fragment. Fragments of any length are accepted, including empty
    /// ones. Once a terminal update has been produced further fragments
    /// are ignored.
    pub fn feed(&mut self, fragment: &str) -> Vec<Update> {
        if self.finished {
            if !fragment.is_empty() {
                debug!(len = fragment.len(), "ignoring fragment received after terminal update");
            }
            return Vec::new();
        }

        self.received += fragment.len();
        trace!(len = fragment.len(), received = self.received, "fragment");
        self.buf.push_str(fragment);

        let mut updates = Vec::new();
        loop {
            let resolved = updates.len();
            updates.extend(self.plan_pass());
            while let Some(update) = self.code_pass() {
                updates.push(update);
            }
            updates.extend(self.success_pass());
            if self.finished || updates.len() == resolved {
                break;
            }
        }

        if !self.finished {
            self.discard_inert();
        }
        updates
    }

    /// Signal that the fragment source ended cleanly.
    ///
    /// Applies the configured [`TruncationPolicy`]: under `Silent` this
    /// always succeeds; under `Fail` it reports the unit left open, or the
    /// missing success marker, as an error. Callers turn that error into a
    /// terminal update with [`fail`](Self::fail).
    ///
    /// # Errors
    ///
    /// [`DecodeError::Truncated`] or [`DecodeError::MissingTerminal`] under
    /// the strict policy when no terminal update was produced.
    pub fn finish(&self) -> Result<(), DecodeError> {
        if self.finished {
            return Ok(());
        }

        let pending = self.pending();
        if let Some(unit) = &pending {
            warn!(received = self.received, "stream ended {unit}");
        }

        match self.config.truncation {
            TruncationPolicy::Silent => Ok(()),
            TruncationPolicy::Fail => Err(match pending {
                Some(pending) => DecodeError::Truncated { pending },
                None => DecodeError::MissingTerminal,
            }),
        }
    }

    /// End the decode with a failure.
    ///
    /// Returns the terminal [`Update::Failed`] for `error`, or `None` if a
    /// terminal update was already produced. Buffered input is discarded;
    /// nothing is salvaged from a partially received unit.
    pub fn fail(&mut self, error: &DecodeError) -> Option<Update> {
        if self.finished {
            return None;
        }
        warn!(%error, pending = ?self.pending(), "decode failed");
        self.end();
        Some(Update::Failed {
            error: error.to_string(),
        })
    }

    // ── Extraction passes ───────────────────────────────────────────────

    fn plan_pass(&mut self) -> Option<Update> {
        if let PlanPass::Searching { from } = self.plan {
            match locate(&self.buf, from, PLAN_START) {
                Ok(start) => {
                    trace!(at = start, "plan opened");
                    self.plan = PlanPass::Open {
                        start,
                        from: start + PLAN_START.len(),
                    };
                }
                Err(from) => {
                    self.plan = PlanPass::Searching { from };
                    return None;
                }
            }
        }

        let PlanPass::Open { start, from } = self.plan else {
            return None;
        };
        match locate(&self.buf, from, PLAN_END) {
            Err(from) => {
                self.plan = PlanPass::Open { start, from };
                None
            }
            Ok(end) => {
                let steps = split_steps(&self.buf[start + PLAN_START.len()..end]);
                self.plan = PlanPass::Done;
                self.remove(Span {
                    start,
                    end: end + PLAN_END.len(),
                });
                debug!(steps = steps.len(), "plan resolved");
                Some(Update::Plan { steps })
            }
        }
    }

    fn code_pass(&mut self) -> Option<Update> {
        if let CodePass::Searching { from } = self.code {
            match locate(&self.buf, from, CODE_START) {
                Ok(start) => {
                    self.code = CodePass::Tag {
                        start,
                        from: start + CODE_START.len(),
                    };
                }
                Err(from) => {
                    self.code = CodePass::Searching { from };
                    return None;
                }
            }
        }

        if let CodePass::Tag { start, from } = self.code {
            match locate(&self.buf, from, TAG_CLOSE) {
                Ok(close) => {
                    let path = &self.buf[start + CODE_START.len()..close];
                    trace!(%path, "code block path resolved");
                    self.code = CodePass::Body {
                        start,
                        close,
                        from: close + TAG_CLOSE.len(),
                    };
                }
                Err(from) => {
                    self.code = CodePass::Tag { start, from };
                    return None;
                }
            }
        }

        let CodePass::Body { start, close, from } = self.code else {
            return None;
        };
        match locate(&self.buf, from, CODE_END) {
            Err(from) => {
                self.code = CodePass::Body { start, close, from };
                None
            }
            Ok(end) => {
                let path = self.buf[start + CODE_START.len()..close].to_string();
                let content = self.buf[close + TAG_CLOSE.len()..end].trim().to_string();
                self.code = CodePass::Searching { from: start };
                self.remove(Span {
                    start,
                    end: end + CODE_END.len(),
                });
                debug!(%path, bytes = content.len(), "artifact resolved");
                self.artifacts.insert(path, content);
                Some(Update::Artifacts {
                    artifacts: self.artifacts.clone(),
                })
            }
        }
    }

    fn success_pass(&mut self) -> Option<Update> {
        if let SuccessPass::Searching { from } = self.success {
            match locate(&self.buf, from, SUCCESS) {
                Ok(start) => {
                    self.success = SuccessPass::Open {
                        start,
                        from: start + SUCCESS.len(),
                    };
                }
                Err(from) => {
                    self.success = SuccessPass::Searching { from };
                    return None;
                }
            }
        }

        let SuccessPass::Open { start, from } = self.success else {
            return None;
        };
        match locate(&self.buf, from, TAG_CLOSE) {
            Err(from) => {
                self.success = SuccessPass::Open { start, from };
                None
            }
            Ok(close) => {
                let message = self.buf[start + SUCCESS.len()..close].trim().to_string();
                self.end();
                debug!(%message, received = self.received, "decode completed");
                Some(Update::Completed { message })
            }
        }
    }

    // ── Buffer maintenance ──────────────────────────────────────────────

    /// Drain a resolved unit and move every pass to match.
    fn remove(&mut self, span: Span) {
        self.buf.drain(span.start..span.end);
        self.plan = self.plan.rebased(span);
        self.code = self.code.rebased(span);
        self.success = self.success.rebased(span);
    }

    /// Drop leading text that no pass can match any more.
    fn discard_inert(&mut self) {
        let anchor = [
            self.plan.anchor(),
            Some(self.code.anchor()),
            Some(self.success.anchor()),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(self.buf.len());

        let mut cut = anchor.min(self.buf.len());
        while !self.buf.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            return;
        }

        self.buf.drain(..cut);
        self.plan = self.plan.shifted(cut);
        self.code = self.code.shifted(cut);
        self.success = self.success.shifted(cut);
    }

    fn end(&mut self) {
        self.finished = true;
        self.buf.clear();
        self.plan = PlanPass::Done;
        self.code = CodePass::Searching { from: 0 };
        self.success = SuccessPass::Searching { from: 0 };
    }
}

/// Find `needle` at or after `from`.
///
/// On a miss, returns the cursor for the next search: the first position
/// where a needle split across fragments could still begin.
fn locate(haystack: &str, from: usize, needle: &str) -> Result<usize, usize> {
    find_from(haystack, from, needle)
        .ok_or_else(|| from.max(haystack.len().saturating_sub(needle.len() - 1)))
}

/// Byte-level substring search starting at `from`.
///
/// `from` need not fall on a character boundary; markers are ASCII, so
/// every match position is one.
fn find_from(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle.as_bytes())
        .map(|pos| from + pos)
}

fn split_steps(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode a complete, already-fragmented input synchronously.
///
/// Feeds every fragment, then applies the configured truncation policy
/// as if the source had ended cleanly.
pub fn decode_fragments<'a, I>(fragments: I, config: DecoderConfig) -> Vec<Update>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut decoder = StreamDecoder::with_config(config);
    let mut updates = Vec::new();
    for fragment in fragments {
        updates.extend(decoder.feed(fragment));
        if decoder.is_finished() {
            return updates;
        }
    }
    if let Err(error) = decoder.finish() {
        updates.extend(decoder.fail(&error));
    }
    updates
}
