//! Directory copying and generated-file lookup

use crate::error::RecipeError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use walkdir::WalkDir;

/// Copy every file under `source` into `target`, overwriting whatever is there
///
/// Returns the copied paths relative to `target`, in walk order. Files already
/// in `target` that have no counterpart in `source` are left alone.
pub async fn copy_directory(source: &Path, target: &Path) -> Result<Vec<PathBuf>, RecipeError> {
    if !source.is_dir() {
        return Err(RecipeError::MissingTarget(source.to_path_buf()));
    }

    fs::create_dir_all(target)
        .await
        .map_err(|e| RecipeError::io("failed to create directory", target, e))?;

    let mut copied = Vec::new();

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            RecipeError::io("failed to walk", path, e.into())
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source)
            .unwrap_or(entry.path())
            .to_path_buf();
        let target_path = target.join(&relative);

        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RecipeError::io("failed to create directory", parent, e))?;
        }

        fs::copy(entry.path(), &target_path)
            .await
            .map_err(|e| RecipeError::io("failed to copy to", &target_path, e))?;
        tracing::debug!(file = %relative.display(), "copied");

        copied.push(relative);
    }

    Ok(copied)
}

/// The most recently modified file directly inside `dir`
///
/// Used to find the migration a generator has just written. Ties resolve to
/// the lexically greatest path so the choice is stable.
pub async fn newest_file(dir: &Path) -> Result<PathBuf, RecipeError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RecipeError::NoMigration(dir.to_path_buf()));
        }
        Err(e) => return Err(RecipeError::io("failed to read directory", dir, e)),
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RecipeError::io("failed to read directory", dir, e))?
    {
        let path = entry.path();
        let meta = entry
            .metadata()
            .await
            .map_err(|e| RecipeError::io("failed to stat", &path, e))?;
        if !meta.is_file() {
            continue;
        }
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let is_newer = match &newest {
            None => true,
            Some((best, best_path)) => mtime > *best || (mtime == *best && path > *best_path),
        };
        if is_newer {
            newest = Some((mtime, path));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| RecipeError::NoMigration(dir.to_path_buf()))
}
