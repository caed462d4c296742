//! The generated Rails app as a mutation target
//!
//! [`RailsApp`] offers the primitives a Rails application template expects
//! from its host (`gem`, `generate`, `environment`, `route`, `inject_into_file`
//! and friends), implemented natively against a project directory.

use super::files;
use super::inject::{self, Injection, Placement};
use super::shell::{CommandRunner, CommandSpec};
use crate::error::RecipeError;
use std::path::{Path, PathBuf};

/// Anchor that opens the application class in `config/application.rb`
pub const APPLICATION_SENTINEL: &str = "class Application < Rails::Application\n";

/// Anchor that opens an environment file such as `config/environments/development.rb`
pub const ENV_FILE_SENTINEL: &str = "Rails.application.configure do\n";

/// Anchor that opens the routes block in `config/routes.rb`
pub const ROUTES_SENTINEL: &str = "Rails.application.routes.draw do\n";

/// A Rails project directory plus the runner used for its commands
pub struct RailsApp<R> {
    root: PathBuf,
    runner: R,
    strict: bool,
}

impl<R: CommandRunner> RailsApp<R> {
    /// Wrap an existing app directory
    ///
    /// With `strict` set, a missing anchor aborts instead of being skipped.
    pub fn new(root: impl Into<PathBuf>, runner: R, strict: bool) -> Self {
        Self {
            root: root.into(),
            runner,
            strict,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The app name, taken from the directory name
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string())
    }

    /// Absolute path of a file inside the app
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Run a command from the app root
    pub async fn run(&self, spec: CommandSpec) -> Result<(), RecipeError> {
        self.runner.run(&spec.current_dir(&self.root)).await
    }

    /// Declare a gem dependency at the end of the Gemfile
    pub async fn gem(&self, name: &str, requirements: &[&str]) -> Result<(), RecipeError> {
        let line = gem_line(name, requirements);
        tracing::debug!(%line, "declaring gem");
        inject::append_line(&self.path("Gemfile"), &line).await
    }

    /// `bin/rails generate <what> <args...>`
    pub async fn generate(&self, what: &str, args: &[&str]) -> Result<(), RecipeError> {
        self.run(
            CommandSpec::new("bin/rails")
                .arg("generate")
                .arg(what)
                .args(args.iter().copied()),
        )
        .await
    }

    /// `bin/rails <task>`, e.g. `db:migrate`
    pub async fn rails_command(&self, task: &str) -> Result<(), RecipeError> {
        self.run(CommandSpec::new("bin/rails").arg(task)).await
    }

    /// `git <args...>`
    pub async fn git(&self, args: &[&str]) -> Result<(), RecipeError> {
        self.run(CommandSpec::new("git").args(args.iter().copied()))
            .await
    }

    /// Add a configuration line to the application, or to one environment
    ///
    /// Without `env` the line goes into the application class in
    /// `config/application.rb`; with it, into `config/environments/<env>.rb`.
    pub async fn environment(&self, data: &str, env: Option<&str>) -> Result<Injection, RecipeError> {
        match env {
            None => {
                self.inject_into_file(
                    "config/application.rb",
                    &inject::optimize_indentation(data, 4),
                    Placement::After(APPLICATION_SENTINEL),
                )
                .await
            }
            Some(env) => {
                self.inject_into_file(
                    &format!("config/environments/{}.rb", env),
                    &inject::optimize_indentation(data, 2),
                    Placement::After(ENV_FILE_SENTINEL),
                )
                .await
            }
        }
    }

    /// Add a line at the top of the routes block
    pub async fn route(&self, routing_code: &str) -> Result<Injection, RecipeError> {
        self.inject_into_file(
            "config/routes.rb",
            &inject::optimize_indentation(routing_code, 2),
            Placement::After(ROUTES_SENTINEL),
        )
        .await
    }

    /// Insert literal text relative to an anchor in an app file
    pub async fn inject_into_file(
        &self,
        relative: &str,
        text: &str,
        placement: Placement<'_>,
    ) -> Result<Injection, RecipeError> {
        inject::inject_into_file(&self.path(relative), text, placement, self.strict).await
    }

    /// Replace every literal occurrence of `pattern` in a file
    pub async fn gsub_file(
        &self,
        path: &Path,
        pattern: &str,
        replacement: &str,
    ) -> Result<Injection, RecipeError> {
        inject::gsub_file(path, pattern, replacement, self.strict).await
    }

    /// Copy a source directory over `<app>/<dest>`, overwriting unconditionally
    pub async fn directory(&self, source: &Path, dest: &str) -> Result<Vec<PathBuf>, RecipeError> {
        files::copy_directory(source, &self.path(dest)).await
    }

    /// The most recently modified migration in `db/migrate`
    pub async fn newest_migration(&self) -> Result<PathBuf, RecipeError> {
        files::newest_file(&self.path("db/migrate")).await
    }
}

/// `rails new` invocation that produces an app the recipe can be applied to
pub fn rails_new(name: &str, database: &str) -> CommandSpec {
    CommandSpec::new("rails").args([
        "new",
        name,
        "--skip-webpack-install",
        "--skip-javascript",
        "-d",
        database,
    ])
}

/// Render a Gemfile declaration, e.g. `gem 'devise', '~> 4.7', '>= 4.7.3'`
pub fn gem_line(name: &str, requirements: &[&str]) -> String {
    let parts: Vec<String> = std::iter::once(name)
        .chain(requirements.iter().copied())
        .map(|part| format!("'{}'", part))
        .collect();
    format!("gem {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<CommandSpec>>);

    impl CommandRunner for Recorder {
        async fn run(&self, spec: &CommandSpec) -> Result<(), RecipeError> {
            self.0.lock().unwrap().push(spec.clone());
            Ok(())
        }
    }

    fn app_with(files: &[(&str, &str)]) -> (tempfile::TempDir, RailsApp<Recorder>) {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        let app = RailsApp::new(dir.path(), Recorder::default(), false);
        (dir, app)
    }

    #[test]
    fn test_gem_line() {
        assert_eq!(
            gem_line("devise", &["~> 4.7", ">= 4.7.3"]),
            "gem 'devise', '~> 4.7', '>= 4.7.3'"
        );
        assert_eq!(gem_line("rails", &[]), "gem 'rails'");
    }

    #[test]
    fn test_rails_new_skips_bundled_javascript() {
        assert_eq!(
            rails_new("blog", "postgresql").to_string(),
            "rails new blog --skip-webpack-install --skip-javascript -d postgresql"
        );
    }

    #[tokio::test]
    async fn test_generate_runs_bin_rails_in_root() {
        let (dir, app) = app_with(&[]);
        app.generate("devise", &["User", "admin:boolean"]).await.unwrap();

        let calls = app.runner().0.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to_string(), "bin/rails generate devise User admin:boolean");
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
    }

    #[tokio::test]
    async fn test_environment_targets_application_or_env_file() {
        let (dir, app) = app_with(&[
            (
                "config/application.rb",
                "module Demo\n  class Application < Rails::Application\n    config.load_defaults 6.1\n  end\nend\n",
            ),
            (
                "config/environments/development.rb",
                "Rails.application.configure do\n  config.cache_classes = false\nend\n",
            ),
        ]);

        app.environment("config.active_job.queue_adapter = :sidekiq", None)
            .await
            .unwrap();
        app.environment("config.x = 1", Some("development"))
            .await
            .unwrap();

        let application = std::fs::read_to_string(dir.path().join("config/application.rb")).unwrap();
        assert!(application.contains(
            "class Application < Rails::Application\n    config.active_job.queue_adapter = :sidekiq\n    config.load_defaults"
        ));
        let development =
            std::fs::read_to_string(dir.path().join("config/environments/development.rb")).unwrap();
        assert!(development.starts_with("Rails.application.configure do\n  config.x = 1\n"));
    }

    #[tokio::test]
    async fn test_route_is_indented_inside_block() {
        let (dir, app) = app_with(&[(
            "config/routes.rb",
            "Rails.application.routes.draw do\nend\n",
        )]);
        app.route("root to: 'home#index'").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("config/routes.rb")).unwrap(),
            "Rails.application.routes.draw do\n  root to: 'home#index'\nend\n"
        );
    }

    #[test]
    fn test_name_from_directory() {
        let app = RailsApp::new("/work/blog", Recorder::default(), false);
        assert_eq!(app.name(), "blog");
    }
}
