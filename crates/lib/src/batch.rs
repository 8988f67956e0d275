//! Concurrent batches of commands.
//!
//! Every command in a [`Batch`] is spawned as soon as it is submitted, with
//! its stdout and stderr redirected into a private temporary file. Joining
//! walks the records in submission order: wait for that child, echo its
//! command, replay its captured output, then judge its exit. The transcript is
//! therefore identical from run to run no matter which child finishes first.

use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::process::{Child, Stdio};

use tracing::debug;

use crate::cmd::Cmd;
use crate::process::{ExitOutcome, ProcessError, empty_command};

/// One spawned child and the buffer holding what it printed.
#[derive(Debug)]
pub struct ProcessRecord {
  cmd: Cmd,
  child: Option<Child>,
  spawn_error: Option<io::Error>,
  output: File,
}

impl ProcessRecord {
  fn spawn(cmd: Cmd) -> Result<Self, ProcessError> {
    let rendered = cmd.render();
    let capture = |source: io::Error| ProcessError::Capture {
      cmd: rendered.clone(),
      source,
    };
    let output = tempfile::tempfile().map_err(capture)?;

    let mut record = Self {
      cmd,
      child: None,
      spawn_error: None,
      output,
    };

    let Some(mut command) = record.cmd.to_command() else {
      record.spawn_error = Some(empty_command());
      return Ok(record);
    };

    let stdout = record.output.try_clone().map_err(capture)?;
    let stderr = record.output.try_clone().map_err(capture)?;
    command.stdout(Stdio::from(stdout)).stderr(Stdio::from(stderr));

    match command.spawn() {
      Ok(child) => {
        debug!(cmd = %record.cmd, pid = child.id(), "spawned batch process");
        record.child = Some(child);
      }
      Err(err) => record.spawn_error = Some(err),
    }
    Ok(record)
  }

  pub fn cmd(&self) -> &Cmd {
    &self.cmd
  }

  /// Process id of the child, if it was spawned and not yet reaped.
  pub fn id(&self) -> Option<u32> {
    self.child.as_ref().map(Child::id)
  }

  fn wait(&mut self) -> ExitOutcome {
    if let Some(err) = self.spawn_error.take() {
      return ExitOutcome::SpawnFailed(err);
    }
    match self.child.take() {
      Some(mut child) => match child.wait() {
        Ok(status) => ExitOutcome::from_status(status),
        Err(err) => ExitOutcome::SpawnFailed(err),
      },
      None => ExitOutcome::SpawnFailed(empty_command()),
    }
  }

  /// Echo the command unless it is silent, then replay everything the child printed.
  fn report(&mut self, out: &mut impl Write) -> io::Result<()> {
    if !self.cmd.is_silent() {
      writeln!(out, "{}", self.cmd.render())?;
    }
    self.output.seek(SeekFrom::Start(0))?;
    io::copy(&mut self.output, &mut *out)?;
    out.flush()
  }
}

/// Commands running concurrently, joined in submission order.
#[derive(Debug, Default)]
pub struct Batch {
  records: Vec<ProcessRecord>,
}

impl Batch {
  pub fn new() -> Self {
    Self::default()
  }

  /// Spawn `cmd` immediately and queue it for joining.
  ///
  /// Only failing to set up output capture is an error here; a command that
  /// cannot be spawned is reported when the batch is joined.
  pub fn submit(&mut self, cmd: Cmd) -> Result<(), ProcessError> {
    let record = ProcessRecord::spawn(cmd)?;
    self.records.push(record);
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn records(&self) -> &[ProcessRecord] {
    &self.records
  }

  /// Join every child, writing the transcript to stdout.
  pub fn join(self) -> Result<(), ProcessError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    self.join_into(&mut out)
  }

  /// Join every child in submission order, writing the transcript to `out`.
  ///
  /// The first record that did not succeed still has its command and output
  /// written, and its error is returned. Later records are waited on so no
  /// child is left behind, but their output is discarded.
  pub fn join_into(mut self, out: &mut impl Write) -> Result<(), ProcessError> {
    let mut failure = None;

    for mut record in std::mem::take(&mut self.records) {
      let outcome = record.wait();
      if failure.is_some() {
        debug!(cmd = %record.cmd, outcome = ?outcome, "reaped process after batch failure");
        continue;
      }

      if let Err(source) = record.report(&mut *out) {
        failure = Some(ProcessError::Capture {
          cmd: record.cmd.render(),
          source,
        });
        continue;
      }

      debug!(cmd = %record.cmd, outcome = ?outcome, "joined batch process");
      if let Err(err) = outcome.into_result(&record.cmd) {
        failure = Some(err);
      }
    }

    match failure {
      Some(err) => Err(err),
      None => Ok(()),
    }
  }
}

impl Drop for Batch {
  fn drop(&mut self) {
    for record in &mut self.records {
      if let Some(mut child) = record.child.take() {
        let _ = child.wait();
      }
    }
  }
}

/// Run `cmds` concurrently and join them in order.
pub fn run_batch(cmds: impl IntoIterator<Item = Cmd>) -> Result<(), ProcessError> {
  let mut batch = Batch::new();
  for cmd in cmds {
    batch.submit(cmd)?;
  }
  batch.join()
}
