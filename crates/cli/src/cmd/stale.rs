//! Implementation of the `kiln stale` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use kiln_lib::stale::needs_rebuild;

pub fn cmd_stale(target: &Path, deps: &[PathBuf]) -> Result<()> {
  if needs_rebuild(target, deps)? {
    println!("stale");
  } else {
    println!("fresh");
  }
  Ok(())
}
