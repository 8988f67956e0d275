//! Implementation of the `kiln link` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use kiln_lib::path::TargetKind;
use kiln_lib::toolchain::{Toolchain, ToolchainConfig};

pub fn cmd_link(config: ToolchainConfig, kind: &str, output: &Path, inputs: &[PathBuf]) -> Result<()> {
  let kind: TargetKind = kind.parse()?;
  let toolchain = Toolchain::new(config);
  if !toolchain.link(kind, output, inputs)? {
    debug!(output = %output.display(), %kind, "nothing to link");
  }
  Ok(())
}
