//! Command builder.
//!
//! A [`Cmd`] is the ordered token list of one external invocation. Token 0 is
//! the program. Rendering joins the tokens with single spaces, which is
//! exactly what gets echoed to the transcript before the command runs.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::path::PathError;

/// An external invocation under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cmd {
  tokens: Vec<String>,
  cwd: Option<PathBuf>,
  silent: bool,
}

impl Cmd {
  /// Start a command running `program`.
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      tokens: vec![program.into()],
      ..Self::default()
    }
  }

  /// Start a command running the program at `path`.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PathError> {
    Ok(Self::new(path_token(path.as_ref())?))
  }

  /// Append one token.
  pub fn arg(&mut self, token: impl Into<String>) -> &mut Self {
    self.tokens.push(token.into());
    self
  }

  /// Append every token of `tokens`, in order.
  pub fn args<I, S>(&mut self, tokens: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.tokens.extend(tokens.into_iter().map(Into::into));
    self
  }

  /// Append a path token. Paths that are not valid UTF-8 are rejected rather
  /// than altered, so the echoed line always matches what runs.
  pub fn arg_path(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, PathError> {
    let token = path_token(path.as_ref())?;
    Ok(self.arg(token))
  }

  /// Run the command inside `dir` instead of the current directory.
  pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Do not echo this command when it runs.
  pub fn silent(&mut self) -> &mut Self {
    self.silent = true;
    self
  }

  /// Drop every token and setting so the builder can be reused.
  pub fn clear(&mut self) {
    self.tokens.clear();
    self.cwd = None;
    self.silent = false;
  }

  pub fn program(&self) -> Option<&str> {
    self.tokens.first().map(String::as_str)
  }

  pub fn tokens(&self) -> &[String] {
    &self.tokens
  }

  pub fn cwd(&self) -> Option<&Path> {
    self.cwd.as_deref()
  }

  pub fn is_silent(&self) -> bool {
    self.silent
  }

  pub fn is_empty(&self) -> bool {
    self.tokens.is_empty()
  }

  /// Space-joined tokens, as echoed to the transcript.
  pub fn render(&self) -> String {
    self.tokens.join(" ")
  }

  /// Translate into a `std::process::Command` ready to spawn.
  ///
  /// Returns `None` for an empty command.
  pub fn to_command(&self) -> Option<std::process::Command> {
    let (program, args) = self.tokens.split_first()?;
    let mut command = std::process::Command::new(program);
    command.args(args.iter().map(OsStr::new));
    if let Some(dir) = &self.cwd {
      command.current_dir(dir);
    }
    Some(command)
  }
}

fn path_token(path: &Path) -> Result<&str, PathError> {
  path.to_str().ok_or_else(|| PathError::InvalidPath(path.to_path_buf()))
}

impl fmt::Display for Cmd {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.render())
  }
}

impl<S: Into<String>> FromIterator<S> for Cmd {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    Self {
      tokens: iter.into_iter().map(Into::into).collect(),
      ..Self::default()
    }
  }
}
