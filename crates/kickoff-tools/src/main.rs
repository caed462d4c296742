//! Kickoff CLI - sets up a Rails app with Vite, Devise, Sidekiq and friendly_id

mod logging;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use kickoff_core::recipe::Step;
use kickoff_core::tui::{ApplyArgs, NewApp};
use kickoff_core::ProductConfig;
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Kickoff product configuration
#[derive(Clone)]
pub struct KickoffConfig;

impl ProductConfig for KickoffConfig {
    fn name(&self) -> &'static str {
        "kickoff"
    }

    fn display_name(&self) -> &'static str {
        "Kickoff Vite Rails"
    }

    fn default_template_url(&self) -> &'static str {
        "https://github.com/justalever/kickoff_vite_rails.git"
    }

    fn template_url_env(&self) -> &'static str {
        "KICKOFF_TEMPLATE_URL"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install kickoff-tools --force"
    }

    fn success_message(&self) -> String {
        "Kickoff Vite Rails app successfully created! 👍".to_string()
    }

    fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // Step 1: Switch to the app if it is not the current directory
        if current.as_deref() != Some(dir) {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string());
            steps.push(format!("cd {}", name));
        }

        // Step 2: Start the server
        steps.push("rails server".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "kickoff")]
#[command(about = "Set up a new Rails app with Vite, Devise, Sidekiq and friendly URLs")]
#[command(version)]
pub struct Args {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new Rails app and apply the recipe to it
    New(NewArgs),
    /// Apply the recipe to an existing, freshly generated Rails app
    Apply(CliApplyArgs),
    /// List the recipe steps in execution order
    Steps,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Database {
    #[default]
    Postgresql,
    Mysql,
    Sqlite3,
}

impl Database {
    fn as_str(self) -> &'static str {
        match self {
            Database::Postgresql => "postgresql",
            Database::Mysql => "mysql",
            Database::Sqlite3 => "sqlite3",
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct RecipeOptions {
    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Fail when an anchor is missing instead of skipping that insertion
    #[arg(long)]
    pub strict: bool,

    /// Stream command output instead of showing spinners
    #[arg(long = "show-output")]
    pub show_output: bool,

    /// Skip the check for ruby, bundler, node, yarn and git
    #[arg(long = "skip-tool-check")]
    pub skip_tool_check: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Name of the app directory to generate
    pub app_name: String,

    /// Database adapter for `rails new`
    #[arg(short, long, value_enum, default_value_t = Database::default())]
    pub database: Database,

    #[command(flatten)]
    pub options: RecipeOptions,
}

#[derive(Parser, Debug)]
pub struct CliApplyArgs {
    /// Rails app directory (defaults to the current directory)
    #[arg(short = 'C', long)]
    pub directory: Option<PathBuf>,

    #[command(flatten)]
    pub options: RecipeOptions,
}

impl RecipeOptions {
    fn into_apply_args(self, directory: Option<PathBuf>, new_app: Option<NewApp>) -> ApplyArgs {
        ApplyArgs {
            template_dir: self.template_dir,
            directory,
            new_app,
            strict: self.strict,
            show_output: self.show_output,
            skip_tool_check: self.skip_tool_check,
            yes: self.yes,
        }
    }
}

impl From<NewArgs> for ApplyArgs {
    fn from(args: NewArgs) -> Self {
        let new_app = NewApp {
            name: args.app_name,
            database: args.database.as_str().to_string(),
        };
        args.options.into_apply_args(None, Some(new_app))
    }
}

impl From<CliApplyArgs> for ApplyArgs {
    fn from(args: CliApplyArgs) -> Self {
        args.options.into_apply_args(args.directory, None)
    }
}

fn print_steps() {
    for (i, step) in Step::ALL.iter().enumerate() {
        println!("{:>2}. {}", i + 1, step);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    logging::init_logging(args.verbose, args.quiet)?;
    let config = KickoffConfig;

    let apply_args: ApplyArgs = match args.command {
        Some(Command::New(new_args)) => new_args.into(),
        Some(Command::Apply(apply_args)) => apply_args.into(),
        Some(Command::Steps) => {
            print_steps();
            return Ok(());
        }
        // No subcommand provided, apply to the current directory with prompts
        None => ApplyArgs::default(),
    };

    let result = kickoff_core::run(&config, apply_args, CLI_VERSION).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
