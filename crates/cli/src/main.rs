mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use kiln_lib::toolchain::ToolchainConfig;
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// kiln - incremental native-build driver
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  toolchain: ToolchainArgs,

  #[command(subcommand)]
  command: Commands,
}

/// Toolchain overrides; unset values fall back to CC, AR, CFLAGS and LDFLAGS.
#[derive(Args)]
struct ToolchainArgs {
  /// C compiler program
  #[arg(long, global = true)]
  cc: Option<String>,

  /// Archiver program
  #[arg(long, global = true)]
  ar: Option<String>,

  /// Extra compile flag (repeatable)
  #[arg(long = "cflag", global = true, allow_hyphen_values = true)]
  cflags: Vec<String>,

  /// Extra link flag (repeatable)
  #[arg(long = "lflag", global = true, allow_hyphen_values = true)]
  lflags: Vec<String>,
}

impl ToolchainArgs {
  fn config(&self) -> ToolchainConfig {
    let mut config = ToolchainConfig::from_env();
    if let Some(cc) = &self.cc {
      config.cc = cc.clone();
    }
    if let Some(ar) = &self.ar {
      config.ar = ar.clone();
    }
    if !self.cflags.is_empty() {
      config.cflags = self.cflags.clone();
    }
    if !self.lflags.is_empty() {
      config.lflags = self.lflags.clone();
    }
    config
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Compile <base>.c into <base>.o if it is stale
  Compile {
    /// Source name without extension
    base: PathBuf,

    /// Header (without extension) the object also depends on
    #[arg(long = "dep")]
    deps: Vec<PathBuf>,
  },

  /// Link objects into an executable, static archive or shared library
  Link {
    /// Target kind: exe, static or shared
    kind: String,

    /// Output name, before kind-specific naming
    output: PathBuf,

    /// Object names without extension
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
  },

  /// Compile several sources concurrently
  Batch {
    /// Source names without extension
    #[arg(required = true)]
    bases: Vec<PathBuf>,
  },

  /// Report whether a target is older than its dependencies
  Stale {
    target: PathBuf,

    #[arg(required = true)]
    deps: Vec<PathBuf>,
  },

  /// List source names in a directory
  Sources {
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Extension to look for
    #[arg(long, default_value = "c")]
    ext: String,
  },

  /// Build a subdirectory that owns its own driver
  Enter {
    dir: PathBuf,

    /// Driver binary name inside the directory
    #[arg(long, default_value = "build")]
    driver: PathBuf,

    /// Driver sources; the first one is compiled
    #[arg(long = "source", default_value = "build.c")]
    sources: Vec<PathBuf>,

    /// Arguments forwarded to the driver
    #[arg(last = true)]
    args: Vec<String>,
  },

  /// Rebuild a stale driver and hand over to it; a current driver is not run
  #[command(name = "self")]
  SelfHost {
    /// Driver binary
    #[arg(long)]
    driver: PathBuf,

    /// Driver sources; the first one is compiled
    #[arg(long = "source", required = true)]
    sources: Vec<PathBuf>,

    /// Arguments forwarded to the driver
    #[arg(last = true)]
    args: Vec<String>,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("error: {err:#}"));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let config = cli.toolchain.config();

  match cli.command {
    Commands::Compile { base, deps } => cmd::cmd_compile(config, &base, &deps),
    Commands::Link { kind, output, inputs } => cmd::cmd_link(config, &kind, &output, &inputs),
    Commands::Batch { bases } => cmd::cmd_batch(config, &bases),
    Commands::Stale { target, deps } => cmd::cmd_stale(&target, &deps),
    Commands::Sources { dir, ext } => cmd::cmd_sources(&dir, &ext),
    Commands::Enter {
      dir,
      driver,
      sources,
      args,
    } => cmd::cmd_enter(&config, &dir, driver, sources, args),
    Commands::SelfHost { driver, sources, args } => cmd::cmd_self(&config, driver, sources, args),
  }
}
