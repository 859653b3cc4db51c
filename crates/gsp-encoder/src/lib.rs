#![warn(clippy::pedantic)]

pub mod encoder;
pub mod error;
pub mod prompt;

pub use encoder::GspEncoder;
pub use error::EncodeError;
pub use prompt::{Mode, PromptBuilder};
