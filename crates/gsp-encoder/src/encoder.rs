use std::collections::HashSet;
use std::fmt::Write as _;

use gsp_types::markers::{
    CODE_END, CODE_START, PLAN_END, PLAN_START, SUCCESS, TAG_CLOSE, find_marker,
};
use gsp_types::{ResultState, Status};

use crate::error::EncodeError;

/// GSP encoder: writes well-formed generation stream protocol text.
///
/// The encoder is the producer-side counterpart of the stream decoder:
/// test fixtures, recorded transcripts, and mock generators use it to
/// build exactly the text a model is instructed to emit. Methods append
/// units to an internal list and return `&mut Self` for chaining;
/// [`encode`](Self::encode) validates everything and renders the text.
///
/// # Usage
///
/// ```rust
/// use gsp_encoder::GspEncoder;
///
/// let text = GspEncoder::new()
///     .plan(["1. Pick a module name", "2. Write the main file"])
///     .add_artifact("Hello/Hello.php", "<?php\nclass Hello {}")
///     .success("Module generation is complete.")
///     .encode()
///     .unwrap();
///
/// assert!(text.starts_with("[PLAN_START]\n1. Pick a module name\n"));
/// assert!(text.ends_with("[SUCCESS:Module generation is complete.]\n"));
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────────────────┬───────────────────────────────────┐
/// │ [PLAN_START]             │ optional, at most one             │
/// │ <one step per line>      │                                   │
/// │ [PLAN_END]               │                                   │
/// │ [CODE_START:<path>]      │ zero or more, in insertion order  │
/// │ <content>                │                                   │
/// │ [CODE_END]               │                                   │
/// │ [SUCCESS:<message>]      │ optional, always last             │
/// └──────────────────────────┴───────────────────────────────────┘
/// ```
///
/// Units are separated by a blank line. The decoder trims artifact
/// content, so leading and trailing whitespace does not survive a
/// round trip.
#[derive(Debug, Default)]
pub struct GspEncoder {
    plan: Option<Vec<String>>,
    artifacts: Vec<(String, String)>,
    message: Option<String>,
}

impl GspEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an encoder that reproduces a decoded result.
    ///
    /// The success marker is written only for a completed result; a
    /// failed result has no protocol representation for its error.
    #[must_use]
    pub fn from_result(state: &ResultState) -> Self {
        let mut encoder = Self::new();
        if !state.plan.is_empty() {
            encoder.plan(&state.plan);
        }
        for (path, content) in &state.artifacts {
            encoder.add_artifact(path, content);
        }
        if let Status::Completed { message } = &state.status {
            encoder.success(message);
        }
        encoder
    }

    /// Set the plan steps. Calling this again replaces the plan.
    pub fn plan<I, S>(&mut self, steps: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.plan = Some(steps.into_iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    /// Append one code block.
    pub fn add_artifact(&mut self, path: &str, content: &str) -> &mut Self {
        self.artifacts.push((path.to_string(), content.to_string()));
        self
    }

    /// Set the terminal success message.
    pub fn success(&mut self, message: &str) -> &mut Self {
        self.message = Some(message.to_string());
        self
    }

    /// Validate all units and render the protocol text.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] when nothing was added or when a field
    /// contains text that would end its unit early.
    pub fn encode(&self) -> Result<String, EncodeError> {
        if self.plan.is_none() && self.artifacts.is_empty() && self.message.is_none() {
            return Err(EncodeError::EmptyPayload);
        }
        self.validate()?;

        let mut out = String::new();
        let mut first = true;
        let mut separate = |out: &mut String| {
            if !std::mem::take(&mut first) {
                out.push('\n');
            }
        };

        if let Some(steps) = &self.plan {
            separate(&mut out);
            out.push_str(PLAN_START);
            out.push('\n');
            for step in steps {
                out.push_str(step);
                out.push('\n');
            }
            out.push_str(PLAN_END);
            out.push('\n');
        }

        for (path, content) in &self.artifacts {
            separate(&mut out);
            let _ = writeln!(out, "{CODE_START}{path}{TAG_CLOSE}");
            out.push_str(content);
            out.push('\n');
            out.push_str(CODE_END);
            out.push('\n');
        }

        if let Some(message) = &self.message {
            separate(&mut out);
            let _ = writeln!(out, "{SUCCESS}{message}{TAG_CLOSE}");
        }

        Ok(out)
    }

    fn validate(&self) -> Result<(), EncodeError> {
        for (index, step) in self.plan.iter().flatten().enumerate() {
            let reason = if step.trim().is_empty() {
                Some("step is blank")
            } else if step.contains('\n') || step.contains('\r') {
                Some("step spans several lines")
            } else if find_marker(step).is_some() {
                Some("step contains a protocol marker")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(EncodeError::InvalidStep { index, reason });
            }
        }

        let mut seen = HashSet::new();
        for (path, content) in &self.artifacts {
            let reason = if path.is_empty() {
                Some("path is empty")
            } else if path.contains(TAG_CLOSE) {
                Some("path contains ']'")
            } else if find_marker(&format!("{path}{TAG_CLOSE}")).is_some() {
                Some("path contains a protocol marker")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(EncodeError::InvalidPath {
                    path: path.clone(),
                    reason,
                });
            }
            if let Some(marker) = find_marker(content) {
                return Err(EncodeError::InvalidContent {
                    path: path.clone(),
                    marker,
                });
            }
            if !seen.insert(path.as_str()) {
                return Err(EncodeError::DuplicatePath { path: path.clone() });
            }
        }

        if let Some(message) = &self.message {
            let reason = if message.contains(TAG_CLOSE) {
                Some("message contains ']'")
            } else if find_marker(&format!("{message}{TAG_CLOSE}")).is_some() {
                Some("message contains a protocol marker")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(EncodeError::InvalidMessage { reason });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsp_decoder::StreamDecoder;

    #[test]
    fn full_layout() {
        let text = GspEncoder::new()
            .plan(["1. x", "2. y"])
            .add_artifact("a.php", "<?php")
            .success("done")
            .encode()
            .unwrap();
        assert_eq!(
            text,
            "[PLAN_START]\n1. x\n2. y\n[PLAN_END]\n\n\
             [CODE_START:a.php]\n<?php\n[CODE_END]\n\n\
             [SUCCESS:done]\n"
        );
    }

    #[test]
    fn empty_encoder_is_rejected() {
        assert_eq!(GspEncoder::new().encode(), Err(EncodeError::EmptyPayload));
    }

    #[test]
    fn blank_step_is_rejected() {
        let err = GspEncoder::new().plan(["1. x", "  "]).encode().unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidStep {
                index: 1,
                reason: "step is blank"
            }
        );
    }

    #[test]
    fn bracket_in_path_is_rejected() {
        let err = GspEncoder::new().add_artifact("a]b", "x").encode().unwrap_err();
        assert!(matches!(err, EncodeError::InvalidPath { .. }));
    }

    #[test]
    fn end_marker_in_content_is_rejected() {
        let err = GspEncoder::new()
            .add_artifact("a", "x [CODE_END] y")
            .encode()
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidContent {
                path: "a".into(),
                marker: CODE_END
            }
        );
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let err = GspEncoder::new()
            .add_artifact("a", "1")
            .add_artifact("a", "2")
            .encode()
            .unwrap_err();
        assert_eq!(err, EncodeError::DuplicatePath { path: "a".into() });
    }

    #[test]
    fn bracket_in_message_is_rejected() {
        let err = GspEncoder::new().success("[done]").encode().unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidMessage {
                reason: "message contains ']'"
            }
        );
    }

    #[test]
    fn markers_in_fields_are_rejected() {
        let err = GspEncoder::new()
            .add_artifact("README.md", "finish with [SUCCESS:your message]")
            .encode()
            .unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidContent {
                path: "README.md".into(),
                marker: SUCCESS
            }
        );

        let err = GspEncoder::new().plan(["1. emit [CODE_START:x"]).encode().unwrap_err();
        assert!(matches!(err, EncodeError::InvalidStep { index: 0, .. }));

        // The closing `]` would complete `[PLAN_START]`.
        let err = GspEncoder::new().add_artifact("a[PLAN_START", "x").encode().unwrap_err();
        assert!(matches!(err, EncodeError::InvalidPath { .. }));

        let err = GspEncoder::new().success("done [CODE_END").encode().unwrap_err();
        assert!(matches!(err, EncodeError::InvalidMessage { .. }));
    }

    #[test]
    fn decoded_result_reencodes_to_the_same_result() {
        let text = GspEncoder::new()
            .plan(["1. x"])
            .add_artifact("b.xml", "<module/>")
            .add_artifact("a.php", "<?php")
            .success("ok")
            .encode()
            .unwrap();

        let mut decoder = StreamDecoder::new();
        let first = ResultState::from_updates(decoder.feed(&text));

        let again = GspEncoder::from_result(&first).encode().unwrap();
        assert_eq!(again, text);
    }
}
