//! Interactive terminal flow (feature `tui`)

pub mod prompts;

pub use prompts::{run, ApplyArgs, NewApp};
