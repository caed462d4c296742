//! Background jobs: Sidekiq as the Active Job adapter, with its admin-only web UI

use crate::host::app::ROUTES_SENTINEL;
use crate::host::{CommandRunner, Placement, RailsApp};
use crate::recipe::StepReport;
use anyhow::Result;

pub const QUEUE_ADAPTER: &str = "config.active_job.queue_adapter = :sidekiq";

pub const ROUTES_FILE: &str = "config/routes.rb";

pub const SIDEKIQ_REQUIRE: &str = "require 'sidekiq/web'\n\n";

/// Mounts the dashboard behind a Devise admin check
pub const SIDEKIQ_MOUNT: &str = "    authenticate :user, lambda { |u| u.admin? } do
      mount Sidekiq::Web => '/sidekiq'
    end
\n\n";

pub async fn add_sidekiq<R: CommandRunner>(app: &RailsApp<R>) -> Result<StepReport> {
    let mut report = StepReport::default();

    report.record(app.environment(QUEUE_ADAPTER, None).await?);

    let anchor = ROUTES_SENTINEL.trim_end_matches('\n');
    report.record(
        app.inject_into_file(ROUTES_FILE, SIDEKIQ_REQUIRE, Placement::Before(anchor))
            .await?,
    );
    report.record(
        app.inject_into_file(ROUTES_FILE, SIDEKIQ_MOUNT, Placement::After(ROUTES_SENTINEL))
            .await?,
    );

    Ok(report)
}
