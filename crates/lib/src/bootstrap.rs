//! Self-hosting driver bootstrap.
//!
//! A build driver starts by checking whether its own binary is older than its
//! sources. If so it recompiles itself with a plain `cc -o <driver> <source>`
//! and replaces the running process with the fresh binary, forwarding the
//! original arguments, so the new code serves the rest of the invocation.
//!
//! A driver can also delegate into a subdirectory owning its own driver: the
//! subdirectory's driver is (re)built when needed and run there, bracketed by
//! `cd` trace lines in the transcript.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cmd::Cmd;
use crate::path::PathError;
use crate::process::{self, ProcessError};
use crate::stale::{self, StaleError};

const BACKUP_EXT: &str = "bak";

#[derive(Debug, Error)]
pub enum BootstrapError {
  #[error("no driver source configured for `{binary}'")]
  NoSources { binary: PathBuf },

  #[error(transparent)]
  Stale(#[from] StaleError),

  #[error(transparent)]
  Path(#[from] PathError),

  #[error("argument is not valid UTF-8: {0:?}")]
  InvalidArgument(OsString),

  #[error("unable to rebuild `{binary}' (bootstrapping may be necessary): {source}")]
  RebuildFailed {
    binary: PathBuf,
    #[source]
    source: ProcessError,
  },

  #[error("unable to back up `{binary}': {source}")]
  Backup {
    binary: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("unable to restart `{binary}': {source}")]
  Restart {
    binary: PathBuf,
    #[source]
    source: ProcessError,
  },

  #[error("unable to resolve `{dir}': {source}")]
  Resolve {
    dir: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("build in `{dir}' failed: {source}")]
  Delegated {
    dir: PathBuf,
    #[source]
    source: ProcessError,
  },
}

/// What the caller should do once the bootstrap returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  /// The driver is current; run the project's build logic in this process.
  Proceed,
  /// A subdirectory build ran to completion; nothing else to do for it.
  Delegated,
}

/// Identity of a self-hosting driver: its binary, its sources, and the
/// arguments it was invoked with.
#[derive(Debug, Clone)]
pub struct Bootstrap {
  binary: PathBuf,
  sources: Vec<PathBuf>,
  compiler: String,
  args: Vec<String>,
}

impl Bootstrap {
  /// A driver built from `sources`; the first source is the one compiled, the
  /// rest (typically headers) only take part in the staleness check.
  pub fn new<I, P>(binary: impl Into<PathBuf>, sources: I) -> Self
  where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
  {
    Self {
      binary: binary.into(),
      sources: sources.into_iter().map(Into::into).collect(),
      compiler: "cc".to_string(),
      args: Vec::new(),
    }
  }

  /// The running driver, as named by `argv[0]`, forwarding the rest of `argv`.
  pub fn from_env<I, P>(sources: I) -> Result<Self, BootstrapError>
  where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
  {
    let mut argv = std::env::args_os();
    let binary = match argv.next() {
      Some(argv0) => PathBuf::from(argv0),
      None => std::env::current_exe().map_err(|source| BootstrapError::Resolve {
        dir: PathBuf::from("."),
        source,
      })?,
    };
    let args = argv
      .map(|arg| arg.into_string().map_err(BootstrapError::InvalidArgument))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self::new(binary, sources).with_args(args))
  }

  pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
    self.compiler = compiler.into();
    self
  }

  pub fn with_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args = args.into_iter().map(Into::into).collect();
    self
  }

  pub fn binary(&self) -> &Path {
    &self.binary
  }

  pub fn sources(&self) -> &[PathBuf] {
    &self.sources
  }

  /// Bootstrap from the current directory, or delegate into `subdir`.
  ///
  /// When the driver had to be rebuilt, the process is replaced by the new
  /// binary and this only returns if that replacement failed.
  pub fn run(&self, subdir: Option<&Path>) -> Result<Flow, BootstrapError> {
    match subdir {
      Some(dir) => self.delegate(dir),
      None => {
        if self.rebuild()? {
          return Err(self.restart());
        }
        Ok(Flow::Proceed)
      }
    }
  }

  /// Recompile the driver if it is older than its sources.
  ///
  /// An existing binary is backed up first and restored if compilation fails.
  /// Returns whether the driver was rebuilt.
  pub fn rebuild(&self) -> Result<bool, BootstrapError> {
    if !stale::needs_rebuild(&self.binary, &self.sources)? {
      debug!(binary = %self.binary.display(), "driver up to date");
      return Ok(false);
    }

    info!(binary = %self.binary.display(), "rebuilding driver");
    println!("Rebuilding {}", self.binary.display());

    let cmd = compile_cmd(&self.compiler, &self.binary, self.first_source()?, None)?;
    let backup = self.backup()?;
    if let Err(source) = process::run_sync(&cmd) {
      warn!(binary = %self.binary.display(), "driver rebuild failed");
      if let Some(backup) = &backup {
        println!("Rebuild unsuccessful, restoring backup");
        self.restore(backup)?;
      }
      return Err(BootstrapError::RebuildFailed {
        binary: self.binary.clone(),
        source,
      });
    }

    if let Some(backup) = &backup {
      remove_backup(&self.binary, backup)?;
    }
    println!("Rebuild successful");
    Ok(true)
  }

  /// Replace the current process with the driver binary, forwarding the arguments.
  fn restart(&self) -> BootstrapError {
    let mut cmd = match Cmd::from_path(runnable(&self.binary)) {
      Ok(cmd) => cmd,
      Err(err) => return err.into(),
    };
    cmd.args(self.args.iter().cloned()).silent();
    BootstrapError::Restart {
      binary: self.binary.clone(),
      source: process::exec(&cmd),
    }
  }

  fn delegate(&self, dir: &Path) -> Result<Flow, BootstrapError> {
    let current = std::env::current_dir().map_err(|source| BootstrapError::Resolve {
      dir: PathBuf::from("."),
      source,
    })?;
    let absolute = dunce::canonicalize(dir).map_err(|source| BootstrapError::Resolve {
      dir: dir.to_path_buf(),
      source,
    })?;

    if absolute == current {
      return self.run(None);
    }

    println!("cd {}/", absolute.display());
    info!(dir = %absolute.display(), "delegating build");

    // The subdirectory owns its own driver: only the driver's name carries
    // over, never the directory the parent driver was started from.
    let name = local_name(&self.binary)?;
    let main_source = local_name(self.first_source()?)?;
    let binary = absolute.join(name);
    let sources: Vec<PathBuf> = self
      .sources
      .iter()
      .map(|source| local_name(source).map(|name| absolute.join(name)))
      .collect::<Result<_, _>>()?;
    let delegated = |source: ProcessError| BootstrapError::Delegated {
      dir: absolute.clone(),
      source,
    };

    if stale::needs_rebuild(&binary, &sources)? {
      let cmd = compile_cmd(&self.compiler, name, main_source, Some(&absolute))?;
      process::run_sync(&cmd).map_err(delegated)?;
    }

    let mut cmd = Cmd::from_path(&binary)?;
    cmd
      .args(self.args.iter().cloned())
      .current_dir(&absolute)
      .silent();
    process::run_sync(&cmd).map_err(delegated)?;

    println!("cd {}/", current.display());
    Ok(Flow::Delegated)
  }

  fn first_source(&self) -> Result<&Path, BootstrapError> {
    self
      .sources
      .first()
      .map(PathBuf::as_path)
      .ok_or_else(|| BootstrapError::NoSources {
        binary: self.binary.clone(),
      })
  }

  fn backup(&self) -> Result<Option<PathBuf>, BootstrapError> {
    if !stale::file_exists(&self.binary)? {
      return Ok(None);
    }
    let backup = backup_path(&self.binary);
    debug!(binary = %self.binary.display(), backup = %backup.display(), "backing up driver");
    std::fs::copy(&self.binary, &backup).map_err(|source| BootstrapError::Backup {
      binary: self.binary.clone(),
      source,
    })?;
    Ok(Some(backup))
  }

  fn restore(&self, backup: &Path) -> Result<(), BootstrapError> {
    std::fs::copy(backup, &self.binary).map_err(|source| BootstrapError::Backup {
      binary: self.binary.clone(),
      source,
    })?;
    remove_backup(&self.binary, backup)
  }
}

fn compile_cmd(compiler: &str, binary: &Path, source: &Path, cwd: Option<&Path>) -> Result<Cmd, BootstrapError> {
  let mut cmd = Cmd::new(compiler);
  cmd.arg("-o").arg_path(binary)?.arg_path(source)?;
  if let Some(dir) = cwd {
    cmd.current_dir(dir);
  }
  Ok(cmd)
}

/// The part of `path` that names something inside the delegated directory.
///
/// Relative paths stay as they are; absolute ones, and ones climbing out with
/// `..`, are reduced to their file name.
fn local_name(path: &Path) -> Result<&Path, BootstrapError> {
  let escapes = path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir));
  if !escapes {
    return Ok(path);
  }
  path
    .file_name()
    .map(Path::new)
    .ok_or_else(|| PathError::InvalidPath(path.to_path_buf()).into())
}

fn remove_backup(binary: &Path, backup: &Path) -> Result<(), BootstrapError> {
  std::fs::remove_file(backup).map_err(|source| BootstrapError::Backup {
    binary: binary.to_path_buf(),
    source,
  })
}

fn backup_path(binary: &Path) -> PathBuf {
  let mut name = binary.as_os_str().to_owned();
  name.push(".");
  name.push(BACKUP_EXT);
  PathBuf::from(name)
}

// A bare name would be looked up on PATH instead of in the working directory.
fn runnable(binary: &Path) -> PathBuf {
  if binary.is_relative() && binary.components().count() == 1 {
    Path::new(".").join(binary)
  } else {
    binary.to_path_buf()
  }
}
