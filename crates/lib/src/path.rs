//! Canonical file naming for build targets.
//!
//! Every file the orchestrator touches is derived from a bare name supplied by
//! the caller: `main` becomes `main.c`, `main.o`, and so on. Libraries gain a
//! `lib` prefix, and shared libraries are resolved to an absolute directory
//! so they can be linked and loaded by a fully-qualified path.

use std::fmt;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::platform;

const LIB_PREFIX: &str = "lib";

/// Errors that can occur while deriving a path.
#[derive(Debug, Error)]
pub enum PathError {
  /// The directory of a shared library could not be made absolute.
  #[error("unable to get the absolute path of `{dir}': {source}")]
  Resolution {
    dir: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The path is not valid UTF-8 and cannot be split into name components.
  #[error("path is not valid UTF-8: {0}")]
  InvalidPath(PathBuf),
}

/// A target kind name that does not correspond to any supported kind.
#[derive(Debug, Error)]
#[error("unknown target kind `{0}'")]
pub struct UnknownTargetKind(pub String);

/// What a build output is, which decides its name and how it gets linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
  Executable,
  StaticArchive,
  SharedLibrary,
  Object,
}

impl TargetKind {
  /// Extension given to outputs of this kind. Executables keep the exact name.
  pub fn extension(&self) -> Option<&'static str> {
    match self {
      Self::Executable => None,
      Self::StaticArchive => Some("a"),
      Self::SharedLibrary => Some(platform::shared_lib_ext()),
      Self::Object => Some("o"),
    }
  }

  pub fn wants_lib_prefix(&self) -> bool {
    matches!(self, Self::StaticArchive | Self::SharedLibrary)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Executable => "executable",
      Self::StaticArchive => "static",
      Self::SharedLibrary => "shared",
      Self::Object => "object",
    }
  }
}

impl fmt::Display for TargetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for TargetKind {
  type Err = UnknownTargetKind;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "x" | "exe" | "executable" => Ok(Self::Executable),
      "s" | "static" => Ok(Self::StaticArchive),
      "d" | "dynamic" | "shared" => Ok(Self::SharedLibrary),
      "o" | "obj" | "object" => Ok(Self::Object),
      other => Err(UnknownTargetKind(other.to_string())),
    }
  }
}

/// A build output: its canonical path plus the kind that produced the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  pub path: PathBuf,
  pub kind: TargetKind,
}

impl Target {
  /// Derive the canonical target for a bare name.
  pub fn new(name: impl AsRef<Path>, kind: TargetKind) -> Result<Self, PathError> {
    let name = name.as_ref();
    let path = match kind.extension() {
      Some(ext) => extend(name, ext, kind.wants_lib_prefix())?,
      None => name.to_path_buf(),
    };
    Ok(Self { path, kind })
  }
}

/// Derive a sibling path of `path` carrying the extension `ext`.
///
/// The old extension (everything after the last dot of the file name) is
/// dropped. With `wants_lib_prefix`, the file name gains a `lib` prefix unless
/// it already has one. When `ext` is the host's shared-library extension, the
/// directory is rewritten to an absolute path, resolving `.` for a bare name.
///
/// ```
/// use kiln_lib::path::extend;
///
/// assert_eq!(extend("src/main.c", "o", false).unwrap().to_str(), Some("src/main.o"));
/// assert_eq!(extend("foo", "a", true).unwrap().to_str(), Some("libfoo.a"));
/// ```
pub fn extend(path: impl AsRef<Path>, ext: &str, wants_lib_prefix: bool) -> Result<PathBuf, PathError> {
  let path = path.as_ref();
  let raw = path.to_str().ok_or_else(|| PathError::InvalidPath(path.to_path_buf()))?;
  let ext = ext.trim_start_matches('.');

  let (dir, rest) = match raw.rfind(std::path::is_separator) {
    Some(idx) => raw.split_at(idx + 1),
    None => ("", raw),
  };
  let basename = rest.rfind('.').map_or(rest, |idx| &rest[..idx]);

  let dir = if ext == platform::shared_lib_ext() {
    absolute_dir(dir)?
  } else {
    dir.to_string()
  };

  let prefix = if wants_lib_prefix && !has_lib_prefix(basename) {
    LIB_PREFIX
  } else {
    ""
  };

  Ok(PathBuf::from(format!("{dir}{prefix}{basename}.{ext}")))
}

// A bare "lib" is a name, not a prefix.
fn has_lib_prefix(basename: &str) -> bool {
  basename.len() > LIB_PREFIX.len() && basename.starts_with(LIB_PREFIX)
}

fn absolute_dir(dir: &str) -> Result<String, PathError> {
  let dir = if dir.is_empty() { "." } else { dir };
  let resolved = dunce::canonicalize(dir).map_err(|source| PathError::Resolution {
    dir: PathBuf::from(dir),
    source,
  })?;
  let mut resolved = resolved
    .to_str()
    .ok_or_else(|| PathError::InvalidPath(resolved.clone()))?
    .to_string();
  if !resolved.ends_with(std::path::is_separator) {
    resolved.push(MAIN_SEPARATOR);
  }
  Ok(resolved)
}
