//! kiln-lib: an incremental native-build orchestrator
//!
//! This crate is embedded into a build driver program. It provides:
//! - `path`: canonical object/library names derived from bare names
//! - `stale`: modification-time staleness checks
//! - `cmd`, `process`, `batch`: echoed external commands, run one at a time
//!   or as a concurrent batch joined in submission order
//! - `toolchain`: compile and link steps gated on staleness
//! - `bootstrap`: the driver recompiling and re-executing itself, and
//!   delegating into subdirectories with their own drivers
//!
//! A minimal driver:
//!
//! ```no_run
//! use kiln_lib::bootstrap::{Bootstrap, Flow};
//! use kiln_lib::path::TargetKind;
//! use kiln_lib::toolchain::{Toolchain, ToolchainConfig};
//!
//! fn build() -> kiln_lib::Result<()> {
//!   let bootstrap = Bootstrap::from_env(["build.c"])?;
//!   if bootstrap.run(None)? != Flow::Proceed {
//!     return Ok(());
//!   }
//!
//!   let toolchain = Toolchain::new(ToolchainConfig::from_env());
//!   let none: [&str; 0] = [];
//!   toolchain.compile("main", &none)?;
//!   toolchain.link(TargetKind::Executable, "main", &["main"])?;
//!   Ok(())
//! }
//!
//! fn main() {
//!   kiln_lib::exit_on_error(build());
//! }
//! ```

pub mod batch;
pub mod bootstrap;
pub mod cmd;
pub mod error;
pub mod path;
pub mod platform;
pub mod process;
pub mod sources;
pub mod stale;
pub mod toolchain;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result, exit_on_error};
