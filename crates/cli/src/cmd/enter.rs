//! Implementation of the `kiln enter` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use kiln_lib::bootstrap::Bootstrap;
use kiln_lib::toolchain::ToolchainConfig;

/// Build `dir` with the driver it owns.
///
/// The driver is compiled with the configured C compiler when it is missing
/// or older than its sources, then run inside `dir` with `args`.
pub fn cmd_enter(
  config: &ToolchainConfig,
  dir: &Path,
  driver: PathBuf,
  sources: Vec<PathBuf>,
  args: Vec<String>,
) -> Result<()> {
  Bootstrap::new(driver, sources)
    .with_compiler(config.cc.as_str())
    .with_args(args)
    .run(Some(dir))?;
  Ok(())
}
