//! Charm-style CLI prompts using cliclack

use crate::host::{rails_new, CommandRunner, RailsApp, ShellRunner};
use crate::product::ProductConfig;
use crate::recipe::{Recipe, Step, StepReport};
use crate::runtime::{self, Tool};
use crate::templates::{version, SourceRoot, TemplateFetcher, TemplateManifest};
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// A new app to generate with `rails new` before applying the recipe
#[derive(Debug, Clone)]
pub struct NewApp {
    pub name: String,
    /// Database adapter passed to `rails new -d`
    pub database: String,
}

/// CLI arguments for applying the recipe
#[derive(Debug, Clone, Default)]
pub struct ApplyArgs {
    /// Local directory to use for templates instead of fetching from remote
    pub template_dir: Option<PathBuf>,

    /// Existing app directory to apply the recipe to
    pub directory: Option<PathBuf>,

    /// Generate this app first
    pub new_app: Option<NewApp>,

    /// Abort when an anchor is missing instead of skipping the insertion
    pub strict: bool,

    /// Stream command output instead of showing spinners
    pub show_output: bool,

    /// Skip the check for ruby, bundler, yarn and friends
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the recipe with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: ApplyArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Check tools (rails itself is only needed to generate a new app)
    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    } else {
        check_tools(args.new_app.is_some())?;
    }

    let runner = ShellRunner::new(args.show_output);

    // Step 2: Generate or locate the app
    let app_dir = match &args.new_app {
        Some(new_app) => generate_app(&runner, new_app).await?,
        None => select_directory(&args)?,
    };

    if !args.yes && args.new_app.is_none() {
        let confirm: bool = cliclack::confirm(format!(
            "Apply the recipe to {}? Files will be modified in place.",
            app_dir.display()
        ))
        .initial_value(true)
        .interact()?;
        if !confirm {
            anyhow::bail!("Setup cancelled.");
        }
    }

    // Step 3: Resolve the template source
    let fetcher = setup_fetcher(config, &args.template_dir)?;
    let source = resolve_source(&fetcher, &runner).await?;

    // Step 4: Read the manifest and check version compatibility
    let manifest = TemplateManifest::load(source.path()).await?;
    if let Some(manifest) = &manifest {
        cliclack::log::info(format!("Template: {} {}", manifest.name, manifest.version))?;
        if let Some(warning) =
            version::check_compatibility(cli_version, &manifest.version, config.upgrade_command())
        {
            cliclack::log::warning(format!(
                "Version warning: {}",
                warning.lines().next().unwrap_or(&warning)
            ))?;
        }
    }

    // Step 5: Run the recipe
    let app = RailsApp::new(&app_dir, runner, args.strict);
    let recipe = Recipe::new(&app, &source, manifest.as_ref());
    run_steps(&recipe, args.show_output).await?;

    // Step 6: Show next steps
    print_next_steps(config, &app_dir)?;

    Ok(())
}

fn check_tools(new_app: bool) -> Result<()> {
    let tools: Vec<Tool> = Tool::ALL
        .iter()
        .copied()
        .filter(|t| new_app || *t != Tool::Rails)
        .collect();

    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    match runtime::check_tools(&tools) {
        Ok(found) => {
            let info: Vec<String> = found
                .iter()
                .map(|r| format!("{} ({})", r.tool, r.version.as_deref().unwrap_or("unknown")))
                .collect();
            spinner.stop(format!("Detected tools: {}", info.join(", ")));
            Ok(())
        }
        Err(e) => {
            spinner.error("Missing tools");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install the missing tools and try again.");
        }
    }
}

async fn generate_app(runner: &ShellRunner, new_app: &NewApp) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let app_dir = current_dir.join(&new_app.name);

    if app_dir.exists() {
        anyhow::bail!("Directory already exists: {}", app_dir.display());
    }

    let spec = rails_new(&new_app.name, &new_app.database).current_dir(&current_dir);
    cliclack::log::step(format!("Running {}", spec.command_line()))?;
    runner.run(&spec).await?;
    cliclack::log::success(format!("Generated {}", app_dir.display()))?;

    Ok(app_dir)
}

fn select_directory(args: &ApplyArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Use --directory flag if provided
    let path = if let Some(dir) = &args.directory {
        if dir.is_absolute() {
            dir.clone()
        } else {
            current_dir.join(dir)
        }
    } else if args.yes {
        current_dir
    } else {
        let input: String = cliclack::input("Rails app directory")
            .placeholder(".")
            .default_input(".")
            .interact()?;

        if input.is_empty() || input == "." {
            current_dir
        } else {
            let p = PathBuf::from(&input);
            if p.is_absolute() {
                p
            } else {
                current_dir.join(p)
            }
        }
    };

    ensure_rails_app(&path)?;
    cliclack::log::info(format!("Using app: {}", path.display()))?;
    Ok(path)
}

/// Refuse directories that were not produced by `rails new`
pub fn ensure_rails_app(path: &Path) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Directory does not exist: {}", path.display());
    }
    for marker in ["Gemfile", "config/routes.rb", "bin/rails"] {
        if !path.join(marker).exists() {
            anyhow::bail!(
                "{} does not look like a Rails app ({} is missing)",
                path.display(),
                marker
            );
        }
    }
    Ok(())
}

fn setup_fetcher<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<TemplateFetcher> {
    let fetcher = match template_dir {
        Some(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
            TemplateFetcher::from_local(path.clone(), config.user_agent())
        }
        None => {
            let fetcher = TemplateFetcher::from_config(config)?;
            cliclack::log::info(format!("Using templates from {}", fetcher.source()))?;
            fetcher
        }
    };

    Ok(fetcher)
}

async fn resolve_source<R: CommandRunner>(
    fetcher: &TemplateFetcher,
    runner: &R,
) -> Result<SourceRoot> {
    let spinner = cliclack::spinner();
    spinner.start(if fetcher.source().is_remote() {
        "Fetching templates..."
    } else {
        "Loading templates..."
    });

    match fetcher.resolve(runner).await {
        Ok(root) => {
            spinner.stop("Templates ready");
            Ok(root)
        }
        Err(e) => {
            spinner.error("Failed to load templates");
            Err(e)
        }
    }
}

async fn run_steps<R: CommandRunner>(recipe: &Recipe<'_, R>, show_output: bool) -> Result<()> {
    for step in Step::ALL {
        let report = if show_output {
            cliclack::log::step(step.title())?;
            recipe.run_step(step).await
        } else {
            let spinner = cliclack::spinner();
            spinner.start(format!("{}...", step.title()));
            let result = recipe.run_step(step).await;
            match &result {
                Ok(report) => spinner.stop(step_summary(step, report)),
                Err(_) => spinner.error(format!("{} failed", step.title())),
            }
            result
        };

        let report = report.map_err(|e| e.context(format!("Step failed: {}", step)))?;
        if report.skipped > 0 {
            cliclack::log::warning(format!(
                "{}: {} insertion(s) skipped because their anchor text was not found",
                step.title(),
                report.skipped
            ))?;
        }
    }
    Ok(())
}

fn step_summary(step: Step, report: &StepReport) -> String {
    if report.copied > 0 {
        format!("{} ({} files)", step.title(), report.copied)
    } else {
        step.title().to_string()
    }
}

fn print_next_steps<C: ProductConfig>(config: &C, app_dir: &Path) -> Result<()> {
    println!();
    println!("  {}", config.success_message().green());
    println!();

    let steps = config.next_steps(app_dir);
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, format!("$ {}", step).yellow());
    }

    cliclack::outro("Happy coding!")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_rails_app() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_rails_app(dir.path()).is_err());

        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("Gemfile"), "").unwrap();
        std::fs::write(dir.path().join("config/routes.rb"), "").unwrap();
        let err = ensure_rails_app(dir.path()).unwrap_err().to_string();
        assert!(err.contains("bin/rails"));

        std::fs::write(dir.path().join("bin/rails"), "").unwrap();
        assert!(ensure_rails_app(dir.path()).is_ok());
    }

    #[test]
    fn test_step_summary_mentions_copied_files() {
        let report = StepReport {
            copied: 3,
            ..StepReport::default()
        };
        assert_eq!(
            step_summary(Step::CopyTemplates, &report),
            "Copy template assets (3 files)"
        );
        assert_eq!(step_summary(Step::Git, &StepReport::default()), "Initialize git repository");
    }
}
