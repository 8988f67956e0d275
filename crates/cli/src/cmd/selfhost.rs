//! Implementation of the `kiln self` command.

use std::path::PathBuf;

use anyhow::Result;

use kiln_lib::bootstrap::{Bootstrap, Flow};
use kiln_lib::toolchain::ToolchainConfig;

use crate::output::print_success;

/// Rebuild `driver` from `sources` if it is stale and hand the process over to
/// it. When the driver is already current, nothing runs.
pub fn cmd_self(config: &ToolchainConfig, driver: PathBuf, sources: Vec<PathBuf>, args: Vec<String>) -> Result<()> {
  let bootstrap = Bootstrap::new(driver, sources)
    .with_compiler(config.cc.as_str())
    .with_args(args);

  if bootstrap.run(None)? == Flow::Proceed {
    print_success(&format!("{} is up to date", bootstrap.binary().display()));
  }
  Ok(())
}
