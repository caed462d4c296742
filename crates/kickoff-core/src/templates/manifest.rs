//! Optional `template.yaml` at the root of a template source

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Asset directory copied into the app when the manifest does not name one
pub const DEFAULT_ASSET_DIR: &str = "app";

/// Manifest file name looked up at the source root
pub const MANIFEST_FILE: &str = "template.yaml";

/// Template manifest (`<source>/template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    #[serde(default)]
    pub description: String,

    /// Semver version for CLI compatibility checking
    pub version: String,

    /// Directory, relative to the source root, copied over the app's `app/`
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_directory() -> String {
    DEFAULT_ASSET_DIR.to_string()
}

impl TemplateManifest {
    /// Read the manifest from a source root, if it has one
    pub async fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(MANIFEST_FILE);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let manifest = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(manifest))
    }

    /// Asset directory to copy, honouring the manifest when present
    pub fn asset_dir(manifest: Option<&Self>) -> &str {
        manifest.map_or(DEFAULT_ASSET_DIR, |m| m.directory.as_str())
    }
}
