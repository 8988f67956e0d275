//! Running external commands.
//!
//! Every command is echoed to stdout before it runs unless it was marked
//! silent, so the transcript can be replayed by hand. Two flavors exist: the
//! supervised run, which spawns a child and waits for it, and [`exec`], which
//! replaces the current process image and only returns on failure.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cmd::Cmd;

/// Errors produced when an external command does not succeed.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The process could not be created.
  #[error("unable to run `{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The process ran and exited with a non-zero status.
  #[error("command exited with status {code}: {cmd}")]
  Exit { cmd: String, code: i32 },

  /// The process was terminated by a signal.
  #[error("command killed by {name}: {cmd}")]
  Signal { cmd: String, signal: i32, name: String },

  /// Captured output could not be buffered or replayed.
  #[error("unable to capture output of `{cmd}': {source}")]
  Capture {
    cmd: String,
    #[source]
    source: io::Error,
  },
}

/// How a child process ended.
#[derive(Debug)]
pub enum ExitOutcome {
  Success,
  NonZeroExit(i32),
  KilledBySignal(i32),
  SpawnFailed(io::Error),
}

impl ExitOutcome {
  pub fn from_status(status: ExitStatus) -> Self {
    if status.success() {
      return Self::Success;
    }
    if let Some(code) = status.code() {
      return Self::NonZeroExit(code);
    }
    #[cfg(unix)]
    {
      use std::os::unix::process::ExitStatusExt;
      if let Some(signal) = status.signal() {
        return Self::KilledBySignal(signal);
      }
    }
    Self::NonZeroExit(1)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, Self::Success)
  }

  /// The OS error number of a failed spawn, if there is one.
  pub fn errno(&self) -> Option<i32> {
    match self {
      Self::SpawnFailed(err) => err.raw_os_error(),
      _ => None,
    }
  }

  /// Turn anything but success into the matching error for `cmd`.
  pub fn into_result(self, cmd: &Cmd) -> Result<(), ProcessError> {
    match self {
      Self::Success => Ok(()),
      Self::NonZeroExit(code) => Err(ProcessError::Exit {
        cmd: cmd.render(),
        code,
      }),
      Self::KilledBySignal(signal) => Err(ProcessError::Signal {
        cmd: cmd.render(),
        signal,
        name: signal_name(signal),
      }),
      Self::SpawnFailed(source) => Err(ProcessError::Spawn {
        program: cmd.program().unwrap_or_default().to_string(),
        source,
      }),
    }
  }
}

/// Human-readable name of a signal number, e.g. `SIGSEGV`.
pub fn signal_name(signal: i32) -> String {
  #[cfg(unix)]
  {
    if let Ok(sig) = nix::sys::signal::Signal::try_from(signal) {
      return sig.as_str().to_string();
    }
  }
  format!("signal {signal}")
}

pub(crate) fn echo(cmd: &Cmd) {
  if !cmd.is_silent() {
    println!("{}", cmd.render());
  }
}

pub(crate) fn empty_command() -> io::Error {
  io::Error::new(io::ErrorKind::InvalidInput, "empty command")
}

/// Echo `cmd`, run it with inherited standard streams and wait for it.
pub fn run(cmd: &Cmd) -> ExitOutcome {
  echo(cmd);

  let Some(mut command) = cmd.to_command() else {
    return ExitOutcome::SpawnFailed(empty_command());
  };

  debug!(cmd = %cmd, cwd = ?cmd.cwd(), "spawning process");

  let status = match command.spawn().and_then(|mut child| child.wait()) {
    Ok(status) => status,
    Err(err) => return ExitOutcome::SpawnFailed(err),
  };

  let outcome = ExitOutcome::from_status(status);
  debug!(cmd = %cmd, outcome = ?outcome, "process finished");
  outcome
}

/// Run `cmd` and fail unless it succeeds.
pub fn run_sync(cmd: &Cmd) -> Result<(), ProcessError> {
  run(cmd).into_result(cmd)
}

/// Run `cmd`, reporting failure without stopping the build.
///
/// Returns whether the command succeeded.
pub fn try_run(cmd: &Cmd) -> bool {
  let outcome = run(cmd);
  if outcome.is_success() {
    return true;
  }
  warn!(cmd = %cmd, outcome = ?outcome, "command failed");
  println!("Previous command ran unsuccessfully, continuing build");
  false
}

/// Replace the current process with `cmd`.
///
/// On success this never returns; the returned error describes why the
/// replacement could not happen. Where the platform cannot replace a process
/// image, the command runs as a child and the current process exits with the
/// child's exit code, which is indistinguishable to the caller.
pub fn exec(cmd: &Cmd) -> ProcessError {
  echo(cmd);

  let program = cmd.program().unwrap_or_default().to_string();
  let Some(mut command) = cmd.to_command() else {
    return ProcessError::Spawn {
      program,
      source: empty_command(),
    };
  };

  debug!(cmd = %cmd, "replacing process image");

  #[cfg(unix)]
  {
    use std::os::unix::process::CommandExt;
    let source = command.exec();
    ProcessError::Spawn { program, source }
  }

  #[cfg(not(unix))]
  {
    match command.status() {
      Ok(status) => std::process::exit(status.code().unwrap_or(1)),
      Err(source) => ProcessError::Spawn { program, source },
    }
  }
}
