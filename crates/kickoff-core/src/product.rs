//! Product configuration trait for CLI binaries
//!
//! The recipe engine is product-agnostic: identity, template location and the
//! closing instructions come from a `ProductConfig` implementation supplied by
//! the binary.

use std::path::Path;

/// Configuration trait for a recipe-running CLI
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI command and user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Canonical location of the template repository
    ///
    /// Git URLs are cloned, `.zip` URLs are downloaded and extracted.
    fn default_template_url(&self) -> &'static str;

    /// Environment variable name for overriding the template URL
    fn template_url_env(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// Line shown once the recipe has finished
    fn success_message(&self) -> String;

    /// Commands the user should run next, in order
    fn next_steps(&self, dir: &Path) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
