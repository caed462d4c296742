//! Friendly URLs, database setup and the initial commit

use crate::host::{CommandRunner, RailsApp};
use anyhow::{Context, Result};

pub const COMMIT_MESSAGE: &str = "Initial commit";

pub async fn add_friendly_id<R: CommandRunner>(app: &RailsApp<R>) -> Result<()> {
    app.generate("friendly_id", &[])
        .await
        .context("friendly_id generator failed")
}

pub async fn migrate<R: CommandRunner>(app: &RailsApp<R>) -> Result<()> {
    for task in ["db:create", "db:migrate"] {
        app.rails_command(task)
            .await
            .with_context(|| format!("bin/rails {} failed", task))?;
    }
    Ok(())
}

pub async fn init_git<R: CommandRunner>(app: &RailsApp<R>) -> Result<()> {
    app.git(&["init"]).await?;
    app.git(&["add", "."]).await?;
    app.git(&["commit", "-m", COMMIT_MESSAGE])
        .await
        .context("Failed to create the initial commit")
}
