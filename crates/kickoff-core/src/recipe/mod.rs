//! The Kickoff recipe: a fixed, forward-only sequence of setup steps
//!
//! Every step either completes or aborts the whole run. Nothing is retried or
//! rolled back; a failed run leaves the app partially configured.

pub mod finish;
pub mod gems;
pub mod sidekiq;
pub mod users;
pub mod vite;

use crate::host::{CommandRunner, Injection, RailsApp};
use crate::templates::{copy_template, SourceRoot, TemplateManifest};
use anyhow::{Context, Result};
use std::fmt;

/// One stage of the recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    DeclareGems,
    Bundle,
    Users,
    BackgroundJobs,
    CopyTemplates,
    FrontendPackages,
    Bundler,
    Slugs,
    Database,
    Git,
}

impl Step {
    /// All steps, in execution order
    pub const ALL: [Step; 10] = [
        Step::DeclareGems,
        Step::Bundle,
        Step::Users,
        Step::BackgroundJobs,
        Step::CopyTemplates,
        Step::FrontendPackages,
        Step::Bundler,
        Step::Slugs,
        Step::Database,
        Step::Git,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Step::DeclareGems => "Declare gems",
            Step::Bundle => "Install gems",
            Step::Users => "Set up Devise users",
            Step::BackgroundJobs => "Wire Sidekiq",
            Step::CopyTemplates => "Copy template assets",
            Step::FrontendPackages => "Install frontend packages",
            Step::Bundler => "Configure Vite plugins",
            Step::Slugs => "Set up friendly_id",
            Step::Database => "Create and migrate database",
            Step::Git => "Initialize git repository",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// What a step did besides succeeding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Injections whose anchor was missing and were skipped
    pub skipped: usize,
    /// Files copied into the app
    pub copied: usize,
}

impl StepReport {
    pub fn record(&mut self, injection: Injection) {
        if injection == Injection::AnchorMissing {
            self.skipped += 1;
        }
    }
}

/// The recipe bound to an app and a resolved template source
pub struct Recipe<'a, R> {
    app: &'a RailsApp<R>,
    source: &'a SourceRoot,
    manifest: Option<&'a TemplateManifest>,
}

impl<'a, R: CommandRunner> Recipe<'a, R> {
    pub fn new(
        app: &'a RailsApp<R>,
        source: &'a SourceRoot,
        manifest: Option<&'a TemplateManifest>,
    ) -> Self {
        Self {
            app,
            source,
            manifest,
        }
    }

    pub fn app(&self) -> &RailsApp<R> {
        self.app
    }

    /// Run a single step
    pub async fn run_step(&self, step: Step) -> Result<StepReport> {
        tracing::info!(step = %step, "running step");
        let app = self.app;

        let report = match step {
            Step::DeclareGems => {
                gems::add_gems(app).await?;
                StepReport::default()
            }
            Step::Bundle => {
                gems::bundle(app).await?;
                StepReport::default()
            }
            Step::Users => users::add_users(app).await?,
            Step::BackgroundJobs => sidekiq::add_sidekiq(app).await?,
            Step::CopyTemplates => {
                let copied = copy_template(app, self.source, self.manifest).await?;
                StepReport {
                    copied: copied.len(),
                    ..StepReport::default()
                }
            }
            Step::FrontendPackages => {
                vite::add_javascript(app).await?;
                StepReport::default()
            }
            Step::Bundler => vite::add_vite(app).await?,
            Step::Slugs => {
                finish::add_friendly_id(app).await?;
                StepReport::default()
            }
            Step::Database => {
                finish::migrate(app).await?;
                StepReport::default()
            }
            Step::Git => {
                finish::init_git(app).await?;
                StepReport::default()
            }
        };

        if report.skipped > 0 {
            tracing::warn!(step = %step, skipped = report.skipped, "some insertions were skipped");
        }
        Ok(report)
    }

    /// Run every step in order, stopping at the first failure
    pub async fn apply(&self) -> Result<Vec<(Step, StepReport)>> {
        let mut reports = Vec::with_capacity(Step::ALL.len());
        for step in Step::ALL {
            let report = self
                .run_step(step)
                .await
                .with_context(|| format!("Step failed: {}", step))?;
            reports.push((step, report));
        }
        Ok(reports)
    }
}
