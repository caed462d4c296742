//! Errors raised by the host primitives and template sources

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single recipe primitive
///
/// Orchestration code wraps these in `anyhow` with step context; they are never
/// recovered from locally.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The literal anchor is not present in the target file (strict mode only)
    #[error("anchor {anchor:?} not found in {}", path.display())]
    AnchorNotFound { path: PathBuf, anchor: String },

    /// A file the recipe mutates does not exist
    #[error("target file does not exist: {}", .0.display())]
    MissingTarget(PathBuf),

    /// No generated migration could be located
    #[error("no migration files found in {}", .0.display())]
    NoMigration(PathBuf),

    /// A subprocess exited unsuccessfully
    #[error("`{command}` failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    /// A subprocess could not be started at all
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The template source string could not be interpreted
    #[error("invalid template source {0:?}")]
    InvalidSource(String),

    /// Filesystem error with the path that caused it
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RecipeError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
