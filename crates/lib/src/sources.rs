//! Source discovery.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum SourcesError {
  #[error("unable to read directory `{dir}': {source}")]
  ReadDir {
    dir: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

/// Regular files directly inside `dir` whose extension is `ext`, with that
/// extension stripped, sorted by name.
///
/// The results keep the `dir` prefix, so they can be passed straight to a
/// compile step: `file_names_with_ext("src", "c")` may return `src/main`.
pub fn file_names_with_ext(dir: impl AsRef<Path>, ext: &str) -> Result<Vec<PathBuf>, SourcesError> {
  let dir = dir.as_ref();
  let ext = ext.trim_start_matches('.');
  let mut names = Vec::new();

  for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|source| SourcesError::ReadDir {
      dir: dir.to_path_buf(),
      source,
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let path = entry.path();
    if path.extension().is_some_and(|e| e == ext) {
      names.push(path.with_extension(""));
    }
  }

  Ok(names)
}
