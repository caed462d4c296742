//! Anchor-based text injection
//!
//! Every edit the recipe makes to a generated file is expressed as "find this
//! literal substring, put text next to it". Only the first occurrence of an
//! anchor is used, and nothing checks whether the text is already present, so
//! applying the same injection twice duplicates it.

use crate::error::RecipeError;
use std::path::Path;
use tokio::fs;

/// Where injected text goes relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'a> {
    /// Directly after the first occurrence of the anchor
    After(&'a str),
    /// Directly before the first occurrence of the anchor
    Before(&'a str),
    /// At the end of the file
    End,
}

impl Placement<'_> {
    /// The literal anchor, if this placement has one
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Placement::After(a) | Placement::Before(a) => Some(a),
            Placement::End => None,
        }
    }
}

/// Outcome of a single injection against a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Applied,
    /// The anchor was not found; the file was left untouched
    AnchorMissing,
}

/// Insert `text` into `content` at `placement`
///
/// Returns `None` when the anchor does not occur in `content`.
pub fn inject_str(content: &str, text: &str, placement: Placement<'_>) -> Option<String> {
    let at = match placement {
        Placement::After(anchor) => content.find(anchor)? + anchor.len(),
        Placement::Before(anchor) => content.find(anchor)?,
        Placement::End => content.len(),
    };

    let mut out = String::with_capacity(content.len() + text.len());
    out.push_str(&content[..at]);
    out.push_str(text);
    out.push_str(&content[at..]);
    Some(out)
}

/// Replace every literal occurrence of `pattern` with `replacement`
///
/// Returns `None` when `pattern` does not occur at all.
pub fn replace_all(content: &str, pattern: &str, replacement: &str) -> Option<String> {
    if pattern.is_empty() || !content.contains(pattern) {
        return None;
    }
    Some(content.replace(pattern, replacement))
}

/// Normalise a block of code to a fixed indentation
///
/// Strips the indentation common to all non-blank lines, indents every
/// non-blank line by `amount` spaces and guarantees exactly one trailing
/// newline.
pub fn optimize_indentation(data: &str, amount: usize) -> String {
    let common = data
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    let pad = " ".repeat(amount);

    let mut out = String::new();
    for line in data.trim_end_matches('\n').lines() {
        if line.trim().is_empty() {
            out.push('\n');
            continue;
        }
        out.push_str(&pad);
        out.push_str(&line[common..]);
        out.push('\n');
    }
    if out.is_empty() {
        out.push('\n');
    }
    out
}

/// Inject `text` into the file at `path`
///
/// A missing file is always an error. A missing anchor leaves the file
/// untouched and yields [`Injection::AnchorMissing`], unless `strict` is set,
/// in which case it is an error.
pub async fn inject_into_file(
    path: &Path,
    text: &str,
    placement: Placement<'_>,
    strict: bool,
) -> Result<Injection, RecipeError> {
    let content = read_target(path).await?;

    match inject_str(&content, text, placement) {
        Some(updated) => {
            write_target(path, &updated).await?;
            tracing::debug!(path = %path.display(), ?placement, "injected text");
            Ok(Injection::Applied)
        }
        None => missing_anchor(path, placement.anchor().unwrap_or_default(), strict),
    }
}

/// Replace every occurrence of `pattern` in the file at `path`
///
/// Zero occurrences are treated like a missing anchor.
pub async fn gsub_file(
    path: &Path,
    pattern: &str,
    replacement: &str,
    strict: bool,
) -> Result<Injection, RecipeError> {
    let content = read_target(path).await?;

    match replace_all(&content, pattern, replacement) {
        Some(updated) => {
            write_target(path, &updated).await?;
            tracing::debug!(path = %path.display(), pattern, replacement, "substituted text");
            Ok(Injection::Applied)
        }
        None => missing_anchor(path, pattern, strict),
    }
}

/// Append `line` to the file as its own line
///
/// If the file does not end in a newline one is added first.
pub async fn append_line(path: &Path, line: &str) -> Result<(), RecipeError> {
    let mut content = read_target(path).await?;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');
    write_target(path, &content).await
}

fn missing_anchor(path: &Path, anchor: &str, strict: bool) -> Result<Injection, RecipeError> {
    if strict {
        return Err(RecipeError::AnchorNotFound {
            path: path.to_path_buf(),
            anchor: anchor.to_string(),
        });
    }
    tracing::warn!(
        path = %path.display(),
        anchor,
        "anchor not found, file left unchanged"
    );
    Ok(Injection::AnchorMissing)
}

async fn read_target(path: &Path) -> Result<String, RecipeError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecipeError::MissingTarget(path.to_path_buf()))
        }
        Err(e) => Err(RecipeError::io("failed to read", path, e)),
    }
}

async fn write_target(path: &Path, content: &str) -> Result<(), RecipeError> {
    fs::write(path, content)
        .await
        .map_err(|e| RecipeError::io("failed to write", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VITE_CONFIG: &str = "import { defineConfig } from 'vite'\nimport RubyPlugin from 'vite-plugin-ruby'\n\nexport default defineConfig({\n  plugins: [\n    RubyPlugin(),\n  ],\n})\n";

    #[test]
    fn test_inject_after_first_occurrence_only() {
        let out = inject_str("a X b X c", "!", Placement::After("X")).unwrap();
        assert_eq!(out, "a X! b X c");
    }

    #[test]
    fn test_inject_before() {
        let out = inject_str("head\nbody\n", "pre\n", Placement::Before("body")).unwrap();
        assert_eq!(out, "head\npre\nbody\n");
    }

    #[test]
    fn test_inject_end() {
        let out = inject_str("abc", "def", Placement::End).unwrap();
        assert_eq!(out, "abcdef");
    }

    #[test]
    fn test_missing_anchor_returns_none() {
        assert!(inject_str("nothing here", "x", Placement::After("plugins: [")).is_none());
    }

    #[test]
    fn test_vite_anchor_does_not_match_plugin_imports() {
        let out = inject_str(VITE_CONFIG, "import A from 'a'\n", Placement::After("from 'vite'\n"))
            .unwrap();
        assert!(out.starts_with("import { defineConfig } from 'vite'\nimport A from 'a'\nimport RubyPlugin"));
    }

    #[test]
    fn test_repeated_injections_stack_nearest_to_anchor() {
        let mut content = VITE_CONFIG.to_string();
        for line in ["import One from 'one'\n", "import Two from 'two'\n"] {
            content = inject_str(&content, line, Placement::After("from 'vite'\n")).unwrap();
        }
        let two = content.find("import Two").unwrap();
        let one = content.find("import One").unwrap();
        assert!(two < one);
    }

    #[test]
    fn test_replace_all_replaces_every_occurrence() {
        let out = replace_all("t.boolean :admin\n# :admin\n", ":admin", ":admin, default: false")
            .unwrap();
        assert_eq!(out, "t.boolean :admin, default: false\n# :admin, default: false\n");
        assert!(replace_all("t.string :name", ":admin", "x").is_none());
    }

    #[test]
    fn test_optimize_indentation() {
        assert_eq!(optimize_indentation("root to: 'home#index'", 2), "  root to: 'home#index'\n");
        assert_eq!(
            optimize_indentation("    a do\n      b\n    end\n", 2),
            "  a do\n    b\n  end\n"
        );
        assert_eq!(optimize_indentation("a\n\nb", 4), "    a\n\n    b\n");
    }

    #[tokio::test]
    async fn test_inject_into_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = inject_into_file(&dir.path().join("nope.rb"), "x", Placement::End, false)
            .await
            .unwrap_err();
        assert!(matches!(err, RecipeError::MissingTarget(_)));
    }

    #[tokio::test]
    async fn test_missing_anchor_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.rb");
        let original = "Rails.application.routes.draw\nend\n";
        std::fs::write(&path, original).unwrap();

        let outcome = inject_into_file(
            &path,
            "mount X\n",
            Placement::After("Rails.application.routes.draw do\n"),
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome, Injection::AnchorMissing);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_missing_anchor_is_error_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.rb");
        std::fs::write(&path, "class Admin\nend\n").unwrap();

        let err = inject_into_file(
            &path,
            "\nhas_person_name\n",
            Placement::After("class User < ApplicationRecord"),
            true,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RecipeError::AnchorNotFound { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "class Admin\nend\n");
    }

    #[tokio::test]
    async fn test_append_line_adds_missing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Gemfile");
        std::fs::write(&path, "source 'https://rubygems.org'").unwrap();

        append_line(&path, "gem 'devise'").await.unwrap();
        append_line(&path, "gem 'sidekiq'").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "source 'https://rubygems.org'\ngem 'devise'\ngem 'sidekiq'\n"
        );
    }
}
