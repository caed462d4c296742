//! Authentication: Devise install, the `User` model and its admin flag

use crate::host::{CommandRunner, Placement, RailsApp};
use crate::recipe::StepReport;
use anyhow::{Context, Result};

pub const MAILER_URL_OPTIONS: &str =
    "config.action_mailer.default_url_options = { host: 'localhost', port: 3000 }";

pub const ROOT_ROUTE: &str = "root to: 'home#index'";

/// Fields passed to the Devise model generator
pub const USER_FIELDS: [&str; 4] = ["User", "first_name", "last_name", "admin:boolean"];

pub const ADMIN_COLUMN: &str = ":admin";
pub const ADMIN_COLUMN_DEFAULT: &str = ":admin, default: false";

pub const USER_MODEL: &str = "app/models/user.rb";
pub const USER_CLASS_ANCHOR: &str = "class User < ApplicationRecord";
pub const PERSON_NAME: &str = "\nhas_person_name\n";

pub async fn add_users<R: CommandRunner>(app: &RailsApp<R>) -> Result<StepReport> {
    let mut report = StepReport::default();

    app.generate("devise:install", &[]).await?;

    report.record(
        app.environment(MAILER_URL_OPTIONS, Some("development"))
            .await?,
    );
    report.record(app.route(ROOT_ROUTE).await?);

    app.generate("devise", &USER_FIELDS).await?;

    // The generator does not report what it wrote; take the newest migration
    let migration = app
        .newest_migration()
        .await
        .context("Devise did not leave a migration to patch")?;
    tracing::debug!(migration = %migration.display(), "defaulting admin to false");
    report.record(
        app.gsub_file(&migration, ADMIN_COLUMN, ADMIN_COLUMN_DEFAULT)
            .await?,
    );

    report.record(
        app.inject_into_file(USER_MODEL, PERSON_NAME, Placement::After(USER_CLASS_ANCHOR))
            .await?,
    );

    Ok(report)
}
