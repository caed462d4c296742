//! Detection of the external tools the recipe shells out to

use anyhow::Result;
use std::fmt;
use std::process::Command;

/// External programs the recipe invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Ruby,
    Rails,
    Bundler,
    Node,
    Yarn,
    Git,
}

impl Tool {
    /// Every tool a full run needs, in the order they are first used
    pub const ALL: [Tool; 6] = [
        Tool::Ruby,
        Tool::Rails,
        Tool::Bundler,
        Tool::Node,
        Tool::Yarn,
        Tool::Git,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Ruby => "Ruby",
            Tool::Rails => "Rails",
            Tool::Bundler => "Bundler",
            Tool::Node => "Node.js",
            Tool::Yarn => "Yarn",
            Tool::Git => "Git",
        }
    }

    /// Binary name looked up on PATH
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Ruby => "ruby",
            Tool::Rails => "rails",
            Tool::Bundler => "bundle",
            Tool::Node => "node",
            Tool::Yarn => "yarn",
            Tool::Git => "git",
        }
    }

    fn install_hint(&self) -> &'static str {
        match self {
            Tool::Ruby => "install from https://www.ruby-lang.org",
            Tool::Rails => "gem install rails",
            Tool::Bundler => "gem install bundler",
            Tool::Node => "install from https://nodejs.org",
            Tool::Yarn => "npm install --global yarn",
            Tool::Git => "install from https://git-scm.com",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub tool: Tool,
    pub version: Option<String>,
    pub available: bool,
}

/// Check whether a tool answers `--version`
pub fn check_tool(tool: Tool) -> RuntimeInfo {
    let output = Command::new(tool.binary()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            RuntimeInfo {
                tool,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            tool,
            version: None,
            available: false,
        },
    }
}

/// Check all `tools`, failing with an install hint for each missing one
pub fn check_tools(tools: &[Tool]) -> Result<Vec<RuntimeInfo>> {
    let results: Vec<RuntimeInfo> = tools.iter().map(|t| check_tool(*t)).collect();
    ensure_available(&results)?;
    Ok(results)
}

fn ensure_available(results: &[RuntimeInfo]) -> Result<()> {
    let missing: Vec<String> = results
        .iter()
        .filter(|r| !r.available)
        .map(|r| format!("  - {} ({})", r.tool, r.tool.install_hint()))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!("Missing required tools:\n{}", missing.join("\n"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tools_are_listed() {
        let results = vec![
            RuntimeInfo {
                tool: Tool::Ruby,
                version: Some("ruby 3.0.0".to_string()),
                available: true,
            },
            RuntimeInfo {
                tool: Tool::Yarn,
                version: None,
                available: false,
            },
        ];
        let err = ensure_available(&results).unwrap_err().to_string();
        assert!(err.contains("Yarn"));
        assert!(err.contains("npm install --global yarn"));
        assert!(!err.contains("Ruby"));
    }

    #[test]
    fn test_all_available_is_ok() {
        let results = vec![RuntimeInfo {
            tool: Tool::Git,
            version: Some("git version 2.40.0".to_string()),
            available: true,
        }];
        assert!(ensure_available(&results).is_ok());
    }

    #[test]
    fn test_binaries_are_distinct() {
        let mut binaries: Vec<_> = Tool::ALL.iter().map(|t| t.binary()).collect();
        binaries.sort();
        binaries.dedup();
        assert_eq!(binaries.len(), Tool::ALL.len());
    }
}
