//! Implementation of the `kiln sources` command.

use std::path::Path;

use anyhow::{Context, Result};

use kiln_lib::sources::file_names_with_ext;

pub fn cmd_sources(dir: &Path, ext: &str) -> Result<()> {
  let names = file_names_with_ext(dir, ext).with_context(|| format!("Failed to list sources in {}", dir.display()))?;
  for name in names {
    println!("{}", name.display());
  }
  Ok(())
}
