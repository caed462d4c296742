//! Copying the template's asset directory into the app

use crate::host::{CommandRunner, RailsApp};
use crate::templates::fetcher::SourceRoot;
use crate::templates::manifest::TemplateManifest;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Destination of the asset copy, relative to the app root
pub const TARGET_DIR: &str = "app";

/// Copy the template's asset directory over the app's `app/` directory
///
/// Existing files are overwritten without asking. Returns the copied paths
/// relative to `app/`.
pub async fn copy_template<R: CommandRunner>(
    app: &RailsApp<R>,
    root: &SourceRoot,
    manifest: Option<&TemplateManifest>,
) -> Result<Vec<PathBuf>> {
    let source = root.path().join(TemplateManifest::asset_dir(manifest));

    let copied = app
        .directory(&source, TARGET_DIR)
        .await
        .with_context(|| format!("Failed to copy template assets from {}", source.display()))?;

    tracing::info!(count = copied.len(), "copied template assets");
    Ok(copied)
}
