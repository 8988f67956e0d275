//! Implementation of the `kiln compile` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use kiln_lib::toolchain::{Toolchain, ToolchainConfig};

/// Compile `base.c` into `base.o` when the object is older than the source or
/// any `dep.h`. An up-to-date object prints nothing.
pub fn cmd_compile(config: ToolchainConfig, base: &Path, deps: &[PathBuf]) -> Result<()> {
  let toolchain = Toolchain::new(config);
  if !toolchain.compile(base, deps)? {
    debug!(base = %base.display(), "nothing to compile");
  }
  Ok(())
}
