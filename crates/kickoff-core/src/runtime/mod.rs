//! Preflight detection of Ruby, Rails, Bundler, Node.js, Yarn and Git

pub mod check;

pub use check::{check_tool, check_tools, RuntimeInfo, Tool};
