use std::fmt::Write as _;

use gsp_types::markers::{CODE_END, CODE_START, PLAN_END, PLAN_START, SUCCESS, TAG_CLOSE};

/// Default expertise the model is asked to assume.
pub const DEFAULT_DOMAIN: &str = "PrestaShop 8.1/8.2 module development";

/// Whether the generation creates a new artifact set or changes an
/// existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Create,
    /// Modify a previously generated artifact set. `original` is the
    /// description it was generated from and `existing` lists its paths.
    Modify {
        original: String,
        existing: Vec<String>,
    },
}

/// Builds the instruction text sent to the generative model.
///
/// The instruction fixes the output format to exactly the units the
/// stream decoder understands, so the markers in the rendered prompt come
/// from the same constants the decoder matches on.
///
/// ```rust
/// use gsp_encoder::{Mode, PromptBuilder};
///
/// let prompt = PromptBuilder::new("display best sellers")
///     .mode(Mode::Modify {
///         original: "display best sellers".into(),
///         existing: vec!["BestSellers/BestSellers.php".into()],
///     })
///     .build();
///
/// assert!(prompt.contains("modify an existing module"));
/// assert!(prompt.contains("BestSellers/BestSellers.php"));
/// ```
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    description: String,
    mode: Mode,
    domain: String,
}

impl PromptBuilder {
    #[must_use]
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            mode: Mode::Create,
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the expertise the model is asked to assume.
    #[must_use]
    pub fn domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    /// Render the instruction text.
    #[must_use]
    pub fn build(&self) -> String {
        let action = match self.mode {
            Mode::Create => "create a new module",
            Mode::Modify { .. } => "modify an existing module",
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "You are a world-class expert on {}. A user wants to {action}.",
            self.domain
        );

        match &self.mode {
            Mode::Create => {
                let _ = writeln!(out, "Their request is: \"{}\".", self.description);
            }
            Mode::Modify { original, existing } => {
                let _ = writeln!(out, "Original module description: \"{original}\".");
                if !existing.is_empty() {
                    let _ = writeln!(
                        out,
                        "The module has these existing files: {}.",
                        existing.join(", ")
                    );
                }
                let _ = writeln!(out, "Modification request: \"{}\".", self.description);
            }
        }

        out.push_str(
            "\nFirst, decide on a valid CamelCase module name based on the request. \
             It is used for the module's folder and main file.\n\
             Second, write a step-by-step plan for building the module.\n\
             Third, generate the complete code of every file the module needs, \
             each path starting with the module folder.\n\n\
             Format your response EXACTLY as follows, streaming the output incrementally. \
             DO NOT add any other text or explanations outside of this structure.\n\n",
        );

        let _ = writeln!(out, "{PLAN_START}");
        out.push_str("1. First step of the plan...\n2. Second step of the plan...\n3. ...\n");
        let _ = writeln!(out, "{PLAN_END}\n");
        let _ = writeln!(out, "{CODE_START}MyModuleName/MyModuleName.php{TAG_CLOSE}");
        out.push_str("<?php\n// ... code of the main module file\n");
        let _ = writeln!(out, "{CODE_END}\n");
        let _ = writeln!(out, "{CODE_START}MyModuleName/config.xml{TAG_CLOSE}");
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<module>\n    <!-- ... -->\n</module>\n");
        let _ = writeln!(out, "{CODE_END}\n");
        let _ = writeln!(out, "{SUCCESS}Module generation is complete.{TAG_CLOSE}");
        out
    }
}
