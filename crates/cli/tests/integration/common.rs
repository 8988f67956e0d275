//! Shared test helpers for CLI integration tests.

use std::fs::File;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A stand-in C compiler.
///
/// Objects are created empty; any other output becomes a driver script that
/// prints `driver ran <args>`. Sources named `slow.c` take a moment to build
/// and sources named `fail.c` fail with a diagnostic.
const FAKE_CC: &str = r##"#!/bin/sh
out=''
src=''
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    *.c) src="$1" ;;
  esac
  shift
done
case "$src" in
  *slow.c) sleep 0.5 ;;
  *fail.c) echo "$src: error: broken"; exit 1 ;;
esac
echo "compiling $src"
case "$out" in
  *.o) : > "$out" ;;
  *) printf '#!/bin/sh\necho "driver ran $*"\n' > "$out"; chmod +x "$out" ;;
esac
"##;

/// A stand-in archiver: `ar -r <archive> <objects>...`.
const FAKE_AR: &str = r##"#!/bin/sh
[ "$1" = -r ] || exit 2
: > "$2"
"##;

/// Isolated project directory with `cc` and `ar` stand-ins on PATH.
pub struct TestEnv {
  pub temp: TempDir,
  bin: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join(".bin");
    std::fs::create_dir(&bin).unwrap();
    write_executable(&bin.join("cc"), FAKE_CC);
    write_executable(&bin.join("ar"), FAKE_AR);
    Self { temp, bin }
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  /// Create `relative_path` with a modification time far in the past.
  pub fn old_file(&self, relative_path: &str) -> PathBuf {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    File::create(&path)
      .unwrap()
      .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000))
      .unwrap();
    path
  }

  /// A `kiln` command running in the project directory with the stand-ins first on PATH.
  pub fn kiln(&self) -> Command {
    let path = std::env::var_os("PATH").unwrap_or_default();
    let mut dirs = vec![self.bin.clone()];
    dirs.extend(std::env::split_paths(&path));

    let mut cmd = cargo_bin_cmd!("kiln");
    cmd
      .current_dir(self.root())
      .env("PATH", std::env::join_paths(dirs).unwrap())
      .env_remove("CC")
      .env_remove("AR")
      .env_remove("CFLAGS")
      .env_remove("LDFLAGS");
    cmd
  }
}

fn write_executable(path: &Path, script: &str) {
  std::fs::write(path, script).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
