//! Gem declarations and the bundle that follows them

use crate::host::{CommandRunner, CommandSpec, RailsApp};
use anyhow::{Context, Result};

/// Gems the recipe depends on, with their version requirements
pub const GEMS: [(&str, &[&str]); 5] = [
    ("devise", &["~> 4.7", ">= 4.7.3"]),
    ("friendly_id", &["~> 5.4", ">= 5.4.2"]),
    ("sidekiq", &["~> 6.2", ">= 6.2.1"]),
    ("name_of_person", &["~> 1.1", ">= 1.1.1"]),
    ("vite_rails", &["~> 2.0", ">= 2.0.9"]),
];

/// Append every gem in [`GEMS`] to the Gemfile
pub async fn add_gems<R: CommandRunner>(app: &RailsApp<R>) -> Result<()> {
    for (name, requirements) in GEMS {
        app.gem(name, requirements)
            .await
            .with_context(|| format!("Failed to declare gem {}", name))?;
    }
    Ok(())
}

/// Install the declared gems; every later step runs after this
pub async fn bundle<R: CommandRunner>(app: &RailsApp<R>) -> Result<()> {
    app.run(CommandSpec::new("bundle").arg("install"))
        .await
        .context("bundle install failed")
}
