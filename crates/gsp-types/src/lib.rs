#![warn(clippy::pedantic)]

pub mod markers;
pub mod state;
pub mod update;

pub use state::{Artifacts, ResultState, Status};
pub use update::Update;
