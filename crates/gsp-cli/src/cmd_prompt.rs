/// Implementation of `gsp prompt`.
///
/// Prints the instruction text a generation call sends to the model.
/// Passing `--existing` switches to modify mode and lists those paths in
/// the prompt.
use gsp_encoder::{Mode, PromptBuilder};

use crate::PromptArgs;

pub fn run(args: &PromptArgs) {
    let mode = if args.existing.is_empty() {
        Mode::Create
    } else {
        Mode::Modify {
            original: args.original.clone().unwrap_or_default(),
            existing: args.existing.clone(),
        }
    };

    let mut builder = PromptBuilder::new(&args.description).mode(mode);
    if let Some(domain) = &args.domain {
        builder = builder.domain(domain);
    }
    print!("{}", builder.build());
}
