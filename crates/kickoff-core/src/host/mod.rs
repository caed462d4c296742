//! Host primitives for mutating a generated Rails app
//!
//! - `inject`: anchor-based text insertion and substitution
//! - `files`: directory copy and newest-file lookup
//! - `shell`: subprocess execution behind the [`CommandRunner`] trait
//! - `app`: [`RailsApp`], which combines the above into Rails generator actions

pub mod app;
pub mod files;
pub mod inject;
pub mod shell;

pub use app::{gem_line, rails_new, RailsApp};
pub use inject::{Injection, Placement};
pub use shell::{CommandRunner, CommandSpec, ShellRunner};
