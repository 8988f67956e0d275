//! Crate-level error type.
//!
//! Nothing in the build core is recoverable: every error ends the driver run.
//! Library functions return these as values; the driver turns them into a
//! diagnostic and a non-zero exit with [`exit_on_error`].

use std::fmt::Display;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::path::{PathError, UnknownTargetKind};
use crate::process::ProcessError;
use crate::sources::SourcesError;
use crate::stale::StaleError;
use crate::toolchain::ToolchainError;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Path(#[from] PathError),

  #[error(transparent)]
  UnknownTargetKind(#[from] UnknownTargetKind),

  #[error(transparent)]
  Stale(#[from] StaleError),

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error(transparent)]
  Toolchain(#[from] ToolchainError),

  #[error(transparent)]
  Bootstrap(#[from] BootstrapError),

  #[error(transparent)]
  Sources(#[from] SourcesError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unwrap `result`, or print `error: <message>` to stderr and exit with status 1.
pub fn exit_on_error<T, E: Display>(result: std::result::Result<T, E>) -> T {
  match result {
    Ok(value) => value,
    Err(err) => {
      eprintln!("error: {err}");
      std::process::exit(1)
    }
  }
}
