//! Resolving the template source root
//!
//! The recipe copies its assets from a source root, which is one of:
//! - Local: a directory on disk, used as-is
//! - Git: a repository cloned into a temporary directory
//! - Archive: a `.zip` downloaded over HTTP and extracted into a temporary directory
//!
//! Temporary roots are deleted when the returned [`SourceRoot`] is dropped.
//! Fetch failures are fatal; nothing is retried.

use crate::error::RecipeError;
use crate::host::shell::{CommandRunner, CommandSpec};
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;
use zip::ZipArchive;

/// Prefix for temporary source directories
const TEMP_PREFIX: &str = "kickoff_vite_rails-";

/// Template source - local directory, git repository or zip archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Local(PathBuf),
    Git { url: String, branch: Option<String> },
    Archive(Url),
}

impl TemplateSource {
    /// Create a remote template source from a product config
    ///
    /// The product's env var, when set, overrides the default URL.
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let location = std::env::var(config.template_url_env())
            .unwrap_or_else(|_| config.default_template_url().to_string());
        Self::parse(&location, config.default_template_url())
    }

    /// Create a local template source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }

    /// Interpret a user-supplied location
    ///
    /// `canonical` is the product's own repository. A raw file URL of the form
    /// `.../<repo>/<branch>/template.rb`, where `<repo>` is the canonical
    /// repository's name, is turned into a clone of `canonical` at `<branch>`.
    pub fn parse(location: &str, canonical: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(RecipeError::InvalidSource(location.to_string()).into());
        }

        if location.starts_with("git@") {
            return Ok(Self::Git {
                url: location.to_string(),
                branch: None,
            });
        }

        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Ok(Self::Local(PathBuf::from(location)));
        }

        let url = Url::parse(location)
            .with_context(|| format!("Invalid template URL: {}", location))?;

        if url.path().ends_with(".zip") {
            return Ok(Self::Archive(url));
        }

        if let Some(branch) = branch_from_template_url(&url, &repository_name(canonical)) {
            return Ok(Self::Git {
                url: canonical.to_string(),
                branch: Some(branch),
            });
        }

        Ok(Self::Git {
            url: url.to_string(),
            branch: None,
        })
    }

    /// Whether resolving this source needs the network
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Local(_))
    }
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Git { url, branch: None } => write!(f, "{}", url),
            Self::Git {
                url,
                branch: Some(branch),
            } => write!(f, "{} ({})", url, branch),
            Self::Archive(url) => write!(f, "{}", url),
        }
    }
}

/// Last path component of a repository URL, without `.git`
fn repository_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    last.trim_end_matches(".git").to_string()
}

/// Extract `<branch>` from `.../<repo>/<branch>/template.rb`
fn branch_from_template_url(url: &Url, repo: &str) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let (last, rest) = segments.split_last()?;
    if *last != "template.rb" {
        return None;
    }
    let repo_at = rest.iter().position(|s| *s == repo)?;
    let branch = rest[repo_at + 1..].join("/");
    (!branch.is_empty()).then_some(branch)
}

/// A resolved source directory
///
/// Holds the temporary directory (if any) alive for as long as it exists.
#[derive(Debug)]
pub struct SourceRoot {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl SourceRoot {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the root lives in a temporary directory
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

/// Template fetcher - turns a [`TemplateSource`] into a [`SourceRoot`]
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = TemplateSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    /// Create a fetcher for local templates
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::local(path), user_agent)
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Produce the source root, fetching it first if it is remote
    pub async fn resolve<R: CommandRunner>(&self, runner: &R) -> Result<SourceRoot> {
        match &self.source {
            TemplateSource::Local(path) => {
                if !path.is_dir() {
                    anyhow::bail!("Template directory not found: {}", path.display());
                }
                let path = path
                    .canonicalize()
                    .with_context(|| format!("Failed to resolve {}", path.display()))?;
                Ok(SourceRoot { path, temp: None })
            }
            TemplateSource::Git { url, branch } => {
                let temp = self.tempdir()?;
                let dest = temp.path().to_string_lossy().into_owned();

                runner
                    .run(&CommandSpec::new("git").args(["clone", "--quiet", url.as_str(), dest.as_str()]))
                    .await
                    .with_context(|| format!("Failed to clone template repository {}", url))?;

                if let Some(branch) = branch {
                    runner
                        .run(
                            &CommandSpec::new("git")
                                .args(["checkout", branch.as_str()])
                                .current_dir(temp.path()),
                        )
                        .await
                        .with_context(|| format!("Failed to check out branch {}", branch))?;
                }

                Ok(SourceRoot {
                    path: temp.path().to_path_buf(),
                    temp: Some(temp),
                })
            }
            TemplateSource::Archive(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch template archive from {}", url))?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch template archive from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }

                let bytes = response.bytes().await?;
                let temp = self.tempdir()?;
                let path = extract_archive(&bytes, temp.path())?;

                Ok(SourceRoot {
                    path,
                    temp: Some(temp),
                })
            }
        }
    }

    fn tempdir(&self) -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempdir()
            .context("Failed to create temporary directory")
    }
}

/// Extract a zip archive into `dest` and return the template root inside it
///
/// Archives produced by code hosts wrap everything in a single top-level
/// directory; when that is the case the root is that directory.
pub fn extract_archive(zip_bytes: &[u8], dest: &Path) -> Result<PathBuf> {
    let mut archive =
        ZipArchive::new(Cursor::new(zip_bytes)).context("Failed to read template archive")?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;

        // Entries that would escape `dest` are skipped
        let Some(relative) = file.enclosed_name() else {
            tracing::warn!(entry = file.name(), "skipping unsafe archive entry");
            continue;
        };
        let out_path = dest.join(relative);

        if file.is_dir() {
            std::fs::create_dir_all(&out_path)
                .with_context(|| format!("Failed to create {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        std::fs::write(&out_path, &contents)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
    }

    let entries: Vec<PathBuf> = std::fs::read_dir(dest)
        .with_context(|| format!("Failed to read {}", dest.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect();

    match entries.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        _ => Ok(dest.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const CANONICAL: &str = "https://github.com/justalever/kickoff_vite_rails.git";

    #[derive(Default)]
    struct Recorder(Mutex<Vec<CommandSpec>>);

    impl CommandRunner for Recorder {
        async fn run(&self, spec: &CommandSpec) -> Result<(), RecipeError> {
            self.0.lock().unwrap().push(spec.clone());
            Ok(())
        }
    }

    fn zip_of(files: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
            let options = SimpleFileOptions::default();
            for (name, content) in files {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buffer
    }

    #[test]
    fn test_parse_local_path() {
        assert_eq!(
            TemplateSource::parse("./templates/kickoff", CANONICAL).unwrap(),
            TemplateSource::Local(PathBuf::from("./templates/kickoff"))
        );
    }

    #[test]
    fn test_parse_rawtemplate_url_extracts_branch() {
        let source = TemplateSource::parse(
            "https://raw.githubusercontent.com/justalever/kickoff_vite_rails/feature/windi/template.rb",
            CANONICAL,
        )
        .unwrap();
        assert_eq!(
            source,
            TemplateSource::Git {
                url: CANONICAL.to_string(),
                branch: Some("feature/windi".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_repository_and_archive_urls() {
        assert_eq!(
            TemplateSource::parse(CANONICAL, CANONICAL).unwrap(),
            TemplateSource::Git {
                url: CANONICAL.to_string(),
                branch: None,
            }
        );
        assert!(matches!(
            TemplateSource::parse(
                "https://github.com/justalever/kickoff_vite_rails/archive/refs/heads/main.zip",
                CANONICAL
            )
            .unwrap(),
            TemplateSource::Archive(_)
        ));
        assert!(TemplateSource::parse("  ", CANONICAL).is_err());
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(repository_name(CANONICAL), "kickoff_vite_rails");
        assert_eq!(repository_name("git@github.com:me/kit.git"), "kit");
    }

    #[tokio::test]
    async fn test_git_source_clones_then_checks_out_branch() {
        let fetcher = TemplateFetcher::new(
            TemplateSource::Git {
                url: CANONICAL.to_string(),
                branch: Some("main".to_string()),
            },
            "kickoff-test",
        );
        let runner = Recorder::default();

        let root = fetcher.resolve(&runner).await.unwrap();
        assert!(root.is_temporary());
        let temp_path = root.path().to_path_buf();
        assert!(temp_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("kickoff_vite_rails-"));

        let calls = runner.0.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args[..3], ["clone", "--quiet", CANONICAL]);
        assert_eq!(calls[1].to_string(), "git checkout main");
        assert_eq!(calls[1].cwd.as_deref(), Some(temp_path.as_path()));

        drop(root);
        assert!(!temp_path.exists());
    }

    #[tokio::test]
    async fn test_local_source_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Recorder::default();

        let missing = TemplateFetcher::from_local(dir.path().join("nope"), "kickoff-test");
        assert!(missing.resolve(&runner).await.is_err());

        let present = TemplateFetcher::from_local(dir.path().to_path_buf(), "kickoff-test");
        let root = present.resolve(&runner).await.unwrap();
        assert!(!root.is_temporary());
        assert!(runner.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_extract_archive_strips_single_top_level_dir() {
        let bytes = zip_of(&[
            ("kickoff_vite_rails-main/template.yaml", "name: Kickoff\nversion: 0.1.0\n"),
            (
                "kickoff_vite_rails-main/app/frontend/controllers/hello_controller.js",
                "export default class {}",
            ),
        ]);
        let dir = tempfile::tempdir().unwrap();

        let root = extract_archive(&bytes, dir.path()).unwrap();

        assert_eq!(root, dir.path().join("kickoff_vite_rails-main"));
        assert!(root.join("app/frontend/controllers/hello_controller.js").is_file());
    }

    #[test]
    fn test_extract_flat_archive_uses_dest() {
        let bytes = zip_of(&[("template.yaml", "x"), ("app/a.js", "y")]);
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(extract_archive(&bytes, dir.path()).unwrap(), dir.path());
    }
}
