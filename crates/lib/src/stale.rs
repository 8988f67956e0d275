//! Modification-time staleness checks.
//!
//! A target needs rebuilding when it does not exist or when any dependency was
//! modified strictly after it. A dependency that does not exist is a
//! configuration mistake and is reported as an error, never as staleness.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::debug;

/// Errors that can occur while checking staleness.
#[derive(Debug, Error)]
pub enum StaleError {
  /// A declared dependency does not exist on disk.
  #[error("dependency `{path}' does not exist")]
  MissingDependency { path: PathBuf },

  /// A file exists but its metadata could not be read.
  #[error("could not access `{path}': {source}")]
  Access {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Returns whether `path` exists.
///
/// Only "not found" counts as absent; any other failure to stat the file is an error.
pub fn file_exists(path: impl AsRef<Path>) -> Result<bool, StaleError> {
  let path = path.as_ref();
  match std::fs::metadata(path) {
    Ok(_) => Ok(true),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(source) => Err(StaleError::Access {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// Returns whether every path in `paths` exists.
pub fn files_exist<P: AsRef<Path>>(paths: &[P]) -> Result<bool, StaleError> {
  for path in paths {
    if !file_exists(path)? {
      return Ok(false);
    }
  }
  Ok(true)
}

/// Decide whether `target` must be rebuilt from `deps`.
///
/// Every dependency must exist, whatever the state of the target. A missing
/// target is always stale. Otherwise the target is stale iff some dependency
/// has a modification time strictly greater than the target's; equal times
/// are not stale.
pub fn needs_rebuild<T, D>(target: T, deps: &[D]) -> Result<bool, StaleError>
where
  T: AsRef<Path>,
  D: AsRef<Path>,
{
  let target = target.as_ref();

  let mut dep_times = Vec::with_capacity(deps.len());
  for dep in deps {
    let dep = dep.as_ref();
    match mtime(dep)? {
      Some(time) => dep_times.push((dep, time)),
      None => return Err(StaleError::MissingDependency { path: dep.to_path_buf() }),
    }
  }

  let Some(target_time) = mtime(target)? else {
    debug!(target = %target.display(), "target missing, rebuilding");
    return Ok(true);
  };

  if let Some((dep, _)) = dep_times.iter().find(|(_, time)| *time > target_time) {
    debug!(target = %target.display(), dep = %dep.display(), "dependency is newer than target");
    return Ok(true);
  }

  debug!(target = %target.display(), "target is up to date");
  Ok(false)
}

fn mtime(path: &Path) -> Result<Option<SystemTime>, StaleError> {
  let access = |source: io::Error| StaleError::Access {
    path: path.to_path_buf(),
    source,
  };
  match std::fs::metadata(path) {
    Ok(meta) => meta.modified().map(Some).map_err(access),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(err) => Err(access(err)),
  }
}
