//! Test utilities for kiln-lib.
//!
//! Helpers for pinning modification times and for running small shell
//! scripts as stand-ins for real toolchain programs.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::cmd::Cmd;

/// A fixed point in time well after the epoch.
const BASE_SECS: u64 = 1_000_000;

/// Create (or truncate) `path` with a modification time `secs` after a fixed base.
///
/// Pinning times keeps staleness tests independent of filesystem timestamp granularity.
pub fn touch_at(path: impl AsRef<Path>, secs: u64) -> PathBuf {
  let path = path.as_ref().to_path_buf();
  let file = File::create(&path).unwrap();
  file
    .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(BASE_SECS + secs))
    .unwrap();
  path
}

/// Set the modification time of an existing file without touching its content.
pub fn set_mtime(path: impl AsRef<Path>, secs: u64) {
  File::options()
    .write(true)
    .open(path)
    .unwrap()
    .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(BASE_SECS + secs))
    .unwrap();
}

/// Write `script` to `path` and make it executable.
#[cfg(unix)]
pub fn write_executable(path: impl AsRef<Path>, script: &str) -> String {
  use std::os::unix::fs::PermissionsExt;

  let path = path.as_ref();
  std::fs::write(path, script).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path.to_str().unwrap().to_string()
}

/// A command running `script` with `/bin/sh -c`.
#[cfg(unix)]
pub fn sh(script: &str) -> Cmd {
  let mut cmd = Cmd::new("/bin/sh");
  cmd.args(["-c", script]);
  cmd
}

/// The path as a `&str`, for comparing against command tokens.
pub fn s(path: &Path) -> String {
  path.to_str().unwrap().to_string()
}
