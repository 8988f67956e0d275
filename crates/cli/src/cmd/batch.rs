//! Implementation of the `kiln batch` command.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use kiln_lib::batch::Batch;
use kiln_lib::toolchain::{Toolchain, ToolchainConfig};

/// Compile every stale source in `bases` concurrently.
///
/// Output appears in the order the sources were given, whichever compiler
/// finishes first.
pub fn cmd_batch(config: ToolchainConfig, bases: &[PathBuf]) -> Result<()> {
  let toolchain = Toolchain::new(config);
  let no_deps: [PathBuf; 0] = [];

  let mut batch = Batch::new();
  for base in bases {
    toolchain.compile_async(&mut batch, base, &no_deps)?;
  }

  debug!(submitted = batch.len(), "joining batch");
  batch.join()?;
  Ok(())
}
