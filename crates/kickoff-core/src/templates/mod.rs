//! Template sources, manifests and asset copying
//!
//! This module provides:
//! - Source resolution from a local directory, git repository or zip archive
//! - The optional `template.yaml` manifest
//! - Version compatibility checking
//! - Copying the template's asset directory into the app

pub mod copier;
pub mod fetcher;
pub mod manifest;
pub mod version;

pub use copier::copy_template;
pub use fetcher::{extract_archive, SourceRoot, TemplateFetcher, TemplateSource};
pub use manifest::TemplateManifest;
pub use version::check_compatibility;
