use serde::{Deserialize, Serialize};

use crate::state::Artifacts;

/// One partial-result update produced by the stream decoder.
///
/// Each fully resolved protocol unit yields exactly one update, carrying
/// only what that unit changed. Callers merge updates into a
/// [`ResultState`](crate::ResultState) in arrival order and match on the
/// variant rather than probing optional fields.
///
/// ```text
/// ┌───────────┬──────────────────────────────┬──────────────────────────┐
/// │ Variant   │ Produced by                  │ Payload                  │
/// ├───────────┼──────────────────────────────┼──────────────────────────┤
/// │ Plan      │ [PLAN_START] … [PLAN_END]    │ Ordered step list        │
/// │ Artifacts │ [CODE_START:p] … [CODE_END]  │ Full artifact snapshot   │
/// │ Completed │ [SUCCESS:msg]                │ Completion message       │
/// │ Failed    │ Upstream source error        │ Human-readable error     │
/// └───────────┴──────────────────────────────┴──────────────────────────┘
/// ```
///
/// `Completed` and `Failed` are terminal: the decoder produces nothing
/// after either of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Update {
    /// The plan block closed. Blank lines are already dropped.
    Plan { steps: Vec<String> },

    /// A code block closed.
    ///
    /// `artifacts` is an owned copy of every artifact resolved so far,
    /// not a diff. A later snapshot always contains every key of an
    /// earlier one.
    Artifacts { artifacts: Artifacts },

    /// The success marker was resolved.
    Completed { message: String },

    /// The fragment source failed, or the stream was truncated under the
    /// strict truncation policy.
    Failed { error: String },
}

impl Update {
    /// Whether this update ends the decode.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }

    /// Short name of the variant, used in logs and CLI output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Plan { .. } => "plan",
            Self::Artifacts { .. } => "artifacts",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}
