//! Kickoff Core - applies the Kickoff Vite Rails recipe to a generated Rails app
//!
//! The recipe turns a fresh `rails new` skeleton into an app with Devise users,
//! Sidekiq background jobs, friendly_id slugs and a Vite frontend with Stimulus
//! hot reload and WindiCSS.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Host primitives** - anchor-based text injection, directory copy,
//!   subprocess execution and the Rails generator actions built on them ([`host`])
//! - **Layer 2: Templates and recipe** - resolving the template source and the
//!   ordered recipe steps ([`templates`], [`recipe`])
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use kickoff_core::{host::{RailsApp, ShellRunner}, recipe::Recipe, templates::TemplateFetcher};
//!
//! let runner = ShellRunner::new(true);
//! let fetcher = TemplateFetcher::from_local("templates/kickoff".into(), "kickoff");
//! let source = fetcher.resolve(&runner).await?;
//! let app = RailsApp::new("blog", runner, false);
//! Recipe::new(&app, &source, None).apply().await?;
//! ```

pub mod error;
pub mod host;
pub mod product;
pub mod recipe;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::RecipeError;
pub use host::{CommandRunner, CommandSpec, RailsApp, ShellRunner};
pub use product::ProductConfig;
pub use recipe::{Recipe, Step, StepReport};
pub use templates::{SourceRoot, TemplateFetcher, TemplateManifest, TemplateSource};

#[cfg(feature = "tui")]
pub use tui::run;
