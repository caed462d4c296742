//! Subprocess execution
//!
//! Commands are plain data ([`CommandSpec`]) and are executed through the
//! [`CommandRunner`] trait, so the recipe can be driven against a recording
//! runner in tests.

use crate::error::RecipeError;
use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; `None` inherits the current one
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// The command line without the working directory, e.g. `bin/rails db:migrate`
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Executes commands to completion
///
/// A non-zero exit is an error; nothing is retried.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), RecipeError>;
}

/// Runs commands as real subprocesses
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    /// Stream the child's output to the terminal instead of capturing it
    echo: bool,
}

impl ShellRunner {
    pub fn new(echo: bool) -> Self {
        Self { echo }
    }
}

impl CommandRunner for ShellRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), RecipeError> {
        let line = spec.command_line();
        tracing::debug!(command = %line, cwd = ?spec.cwd, "running command");

        let mut cmd = TokioCommand::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(if self.echo { Stdio::inherit() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| RecipeError::Spawn {
            command: line.clone(),
            source,
        })?;

        if self.echo {
            println!("{} {}", "Running:".dimmed(), line.yellow());
        }

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(RecipeError::Spawn {
                command: line,
                source: std::io::Error::other("child output was not captured"),
            });
        };

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();
        let mut stderr_tail: Vec<String> = Vec::new();
        let (mut stdout_open, mut stderr_open) = (true, true);

        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout_reader.next_line(), if stdout_open => match line {
                    Ok(Some(line)) => {
                        if self.echo {
                            println!("  {}", line);
                        }
                    }
                    Ok(None) => stdout_open = false,
                    Err(e) => {
                        tracing::warn!("error reading stdout: {}", e);
                        stdout_open = false;
                    }
                },
                line = stderr_reader.next_line(), if stderr_open => match line {
                    Ok(Some(line)) => {
                        if self.echo {
                            eprintln!("  {}", line.yellow());
                        }
                        stderr_tail.push(line);
                        if stderr_tail.len() > 20 {
                            stderr_tail.remove(0);
                        }
                    }
                    Ok(None) => stderr_open = false,
                    Err(e) => {
                        tracing::warn!("error reading stderr: {}", e);
                        stderr_open = false;
                    }
                },
            }
        }

        let status = child.wait().await.map_err(|source| RecipeError::Spawn {
            command: line.clone(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            if !self.echo {
                for l in &stderr_tail {
                    tracing::error!(command = %line, "{}", l);
                }
            }
            Err(RecipeError::CommandFailed {
                command: line,
                code: status.code().unwrap_or(-1),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new("git").args(["commit", "-m", "Initial commit"]);
        assert_eq!(spec.command_line(), "git commit -m \"Initial commit\"");
    }

    #[test]
    fn test_builder_sets_cwd() {
        let spec = CommandSpec::new("bin/rails").arg("db:migrate").current_dir("/tmp/app");
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/tmp/app")));
        assert_eq!(spec.to_string(), "bin/rails db:migrate");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runner_success_and_failure() {
        let runner = ShellRunner::new(false);
        runner.run(&CommandSpec::new("true")).await.unwrap();

        let err = runner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RecipeError::CommandFailed { code: 3, .. }));
    }

    #[tokio::test]
    async fn test_shell_runner_missing_program() {
        let runner = ShellRunner::new(false);
        let err = runner
            .run(&CommandSpec::new("kickoff-definitely-not-a-program"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecipeError::Spawn { .. }));
    }
}
