//! Compile and link orchestration.
//!
//! A [`Toolchain`] owns the compiler, archiver and flag lists for one build
//! run. Each step derives canonical file names, checks staleness, and only
//! then builds and runs a command. A step that is up to date is skipped
//! silently.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::batch::Batch;
use crate::cmd::Cmd;
use crate::path::{PathError, Target, TargetKind, UnknownTargetKind, extend};
use crate::process::{self, ProcessError};
use crate::stale::{self, StaleError};

/// Errors that can occur during a compile or link step.
#[derive(Debug, Error)]
pub enum ToolchainError {
  #[error(transparent)]
  Path(#[from] PathError),

  #[error(transparent)]
  Stale(#[from] StaleError),

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error(transparent)]
  UnknownTargetKind(#[from] UnknownTargetKind),
}

/// Programs and flags used by every compile and link step of a build.
///
/// Flags are opaque and passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
  pub cc: String,
  pub ar: String,
  pub cflags: Vec<String>,
  pub lflags: Vec<String>,
  pub shared_flag: String,
}

impl Default for ToolchainConfig {
  fn default() -> Self {
    Self {
      cc: "cc".to_string(),
      ar: "ar".to_string(),
      cflags: Vec::new(),
      lflags: Vec::new(),
      shared_flag: "-shared".to_string(),
    }
  }
}

impl ToolchainConfig {
  /// Defaults overridden by `CC`, `AR`, `CFLAGS` and `LDFLAGS`.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Defaults overridden by whatever `lookup` returns for `CC`, `AR`, `CFLAGS` and `LDFLAGS`.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let mut config = Self::default();
    if let Some(cc) = lookup("CC").filter(|v| !v.trim().is_empty()) {
      config.cc = cc.trim().to_string();
    }
    if let Some(ar) = lookup("AR").filter(|v| !v.trim().is_empty()) {
      config.ar = ar.trim().to_string();
    }
    if let Some(cflags) = lookup("CFLAGS") {
      config.cflags = split_flags(&cflags);
    }
    if let Some(lflags) = lookup("LDFLAGS") {
      config.lflags = split_flags(&lflags);
    }
    config
  }

  pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
    self.cc = cc.into();
    self
  }

  pub fn with_ar(mut self, ar: impl Into<String>) -> Self {
    self.ar = ar.into();
    self
  }

  pub fn with_cflags<I, S>(mut self, flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.cflags = flags.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_lflags<I, S>(mut self, flags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.lflags = flags.into_iter().map(Into::into).collect();
    self
  }
}

fn split_flags(flags: &str) -> Vec<String> {
  flags.split_ascii_whitespace().map(str::to_string).collect()
}

/// Compile and link steps bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
  config: ToolchainConfig,
}

impl Toolchain {
  pub fn new(config: ToolchainConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &ToolchainConfig {
    &self.config
  }

  /// The command compiling `base.c` into `base.o`, or `None` when the object
  /// is newer than the source and every `dep.h`.
  pub fn compile_cmd<D: AsRef<Path>>(&self, base: impl AsRef<Path>, deps: &[D]) -> Result<Option<Cmd>, ToolchainError> {
    let base = base.as_ref();
    let source = extend(base, "c", false)?;
    let object = extend(base, "o", false)?;

    let mut inputs = Vec::with_capacity(deps.len() + 1);
    inputs.push(source.clone());
    for dep in deps {
      inputs.push(extend(dep, "h", false)?);
    }

    if !stale::needs_rebuild(&object, &inputs)? {
      debug!(object = %object.display(), "object up to date");
      return Ok(None);
    }

    let mut cmd = Cmd::new(self.config.cc.as_str());
    cmd
      .args(self.config.cflags.iter().cloned())
      .args(["-c", "-o"])
      .arg_path(&object)?
      .arg_path(&source)?;
    Ok(Some(cmd))
  }

  /// Compile `base` now if it is stale. Returns whether the compiler ran.
  pub fn compile<D: AsRef<Path>>(&self, base: impl AsRef<Path>, deps: &[D]) -> Result<bool, ToolchainError> {
    match self.compile_cmd(base, deps)? {
      Some(cmd) => {
        process::run_sync(&cmd)?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Queue the compilation of `base` into `batch` if it is stale.
  /// Returns whether a command was submitted.
  pub fn compile_async<D: AsRef<Path>>(
    &self,
    batch: &mut Batch,
    base: impl AsRef<Path>,
    deps: &[D],
  ) -> Result<bool, ToolchainError> {
    match self.compile_cmd(base, deps)? {
      Some(cmd) => {
        batch.submit(cmd)?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// The command producing a `kind` output named after `output` from the
  /// objects of `inputs`, or `None` when the output is up to date.
  pub fn link_cmd<I: AsRef<Path>>(
    &self,
    kind: TargetKind,
    output: impl AsRef<Path>,
    inputs: &[I],
  ) -> Result<Option<Cmd>, ToolchainError> {
    let mut cmd = self.link_prefix(kind)?;

    let target = Target::new(output, kind)?;
    let objects = inputs
      .iter()
      .map(|input| extend(input, "o", false))
      .collect::<Result<Vec<_>, _>>()?;

    if !stale::needs_rebuild(&target.path, &objects)? {
      debug!(target = %target.path.display(), kind = %kind, "target up to date");
      return Ok(None);
    }

    cmd.arg_path(&target.path)?;
    for object in &objects {
      cmd.arg_path(object)?;
    }
    Ok(Some(cmd))
  }

  /// Program and leading flags of a link command, up to the output path.
  fn link_prefix(&self, kind: TargetKind) -> Result<Cmd, ToolchainError> {
    let cfg = &self.config;
    let mut cmd;
    match kind {
      TargetKind::Executable => {
        cmd = Cmd::new(cfg.cc.as_str());
        cmd.args(cfg.lflags.iter().cloned()).arg("-o");
      }
      TargetKind::StaticArchive => {
        cmd = Cmd::new(cfg.ar.as_str());
        cmd.arg("-r");
      }
      TargetKind::SharedLibrary => {
        cmd = Cmd::new(cfg.cc.as_str());
        cmd
          .arg(cfg.shared_flag.as_str())
          .args(cfg.lflags.iter().cloned())
          .arg("-o");
      }
      TargetKind::Object => return Err(UnknownTargetKind(kind.to_string()).into()),
    }
    Ok(cmd)
  }

  /// Link `output` now if it is stale. Returns whether the tool ran.
  pub fn link<I: AsRef<Path>>(
    &self,
    kind: TargetKind,
    output: impl AsRef<Path>,
    inputs: &[I],
  ) -> Result<bool, ToolchainError> {
    match self.link_cmd(kind, output, inputs)? {
      Some(cmd) => {
        process::run_sync(&cmd)?;
        Ok(true)
      }
      None => Ok(false),
    }
  }
}
