use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::update::Update;

/// Artifact path → artifact content.
///
/// Keys are unique; re-emitting a path overwrites its content. Insertion
/// order is kept so artifacts list in the order they were generated, but
/// it carries no protocol meaning.
pub type Artifacts = IndexMap<String, String>;

/// Lifecycle status of a decode result.
///
/// The completion message and the error text live inside their variants,
/// so a result can never carry a message without being completed or an
/// error without having failed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    #[default]
    InProgress,
    Completed { message: String },
    Failed { error: String },
}

/// The accumulated result of one generation call.
///
/// Owned by the caller and updated in place by merging successive
/// [`Update`]s with [`apply`](Self::apply):
///
/// ```text
/// ┌───────────┬─────────────────────────────────────────────────┐
/// │ Update    │ Effect on ResultState                           │
/// ├───────────┼─────────────────────────────────────────────────┤
/// │ Plan      │ plan ← steps                                    │
/// │ Artifacts │ artifacts ← snapshot (complete, replaces map)   │
/// │ Completed │ status ← Completed { message }                  │
/// │ Failed    │ status ← Failed { error }                       │
/// └───────────┴─────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultState {
    pub plan: Vec<String>,
    pub artifacts: Artifacts,
    pub status: Status,
}

impl ResultState {
    /// An empty, in-progress result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An in-progress result that starts from previously generated
    /// artifacts, for modifying an existing artifact set.
    #[must_use]
    pub fn with_artifacts(artifacts: Artifacts) -> Self {
        Self {
            artifacts,
            ..Self::default()
        }
    }

    /// Merge one update into this result.
    ///
    /// Updates must be applied in the order the decoder produced them.
    /// Artifact updates are full snapshots, so the map is replaced
    /// rather than extended.
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Plan { steps } => self.plan = steps,
            Update::Artifacts { artifacts } => self.artifacts = artifacts,
            Update::Completed { message } => self.status = Status::Completed { message },
            Update::Failed { error } => self.status = Status::Failed { error },
        }
    }

    /// Fold a whole update sequence into a fresh result.
    #[must_use]
    pub fn from_updates<I>(updates: I) -> Self
    where
        I: IntoIterator<Item = Update>,
    {
        let mut state = Self::new();
        for update in updates {
            state.apply(update);
        }
        state
    }

    /// Whether a completed or failed update has been merged.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, Status::InProgress)
    }

    /// The completion message, present only once completed.
    #[must_use]
    pub fn completion_message(&self) -> Option<&str> {
        match &self.status {
            Status::Completed { message } => Some(message),
            _ => None,
        }
    }

    /// The error text, present only once failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Failed { error } => Some(error),
            _ => None,
        }
    }
}
