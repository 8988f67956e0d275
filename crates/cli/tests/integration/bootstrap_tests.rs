//! Driver self-rebuild and subdirectory delegation.

use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn stale_driver_rebuilds_then_runs_with_original_args() {
  let env = TestEnv::new();
  env.old_file("drv.c");

  env
    .kiln()
    .args(["self", "--driver", "drv", "--source", "drv.c", "--", "release", "-j2"])
    .assert()
    .success()
    .stdout(
      "Rebuilding drv\n\
       cc -o drv drv.c\n\
       compiling drv.c\n\
       Rebuild successful\n\
       driver ran release -j2\n",
    );

  env
    .kiln()
    .args(["self", "--driver", "drv", "--source", "drv.c", "--", "release", "-j2"])
    .assert()
    .success()
    .stdout(predicate::str::contains("drv is up to date"))
    .stdout(predicate::str::contains("driver ran").not());
}

#[test]
fn failed_driver_rebuild_keeps_previous_binary() {
  let env = TestEnv::new();
  let driver = env.old_file("fail");
  std::fs::write(&driver, "previous").unwrap();
  std::fs::File::options()
    .write(true)
    .open(&driver)
    .unwrap()
    .set_modified(std::time::SystemTime::UNIX_EPOCH)
    .unwrap();
  env.old_file("fail.c");

  env
    .kiln()
    .args(["self", "--driver", "fail", "--source", "fail.c"])
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::contains("Rebuild unsuccessful, restoring backup"))
    .stderr(predicate::str::contains("unable to rebuild `fail'"));

  assert_eq!(std::fs::read_to_string(&driver).unwrap(), "previous");
  assert!(!env.root().join("fail.bak").exists());
}

#[test]
fn enter_builds_and_runs_subdirectory_driver() {
  let env = TestEnv::new();
  env.old_file("sub/build.c");
  let sub = canonical(&env.root().join("sub"));
  let root = canonical(env.root());

  env
    .kiln()
    .args(["enter", "sub", "--", "all"])
    .assert()
    .success()
    .stdout(format!(
      "cd {}/\ncc -o build build.c\ncompiling build.c\ndriver ran all\ncd {}/\n",
      sub.display(),
      root.display()
    ));
  assert!(env.root().join("sub/build").exists());

  env
    .kiln()
    .args(["enter", "sub"])
    .assert()
    .success()
    .stdout(predicate::str::contains("cc -o build").not())
    .stdout(predicate::str::contains("driver ran \n"));
}

#[test]
fn enter_missing_directory_fails() {
  let env = TestEnv::new();

  env
    .kiln()
    .args(["enter", "nowhere"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unable to resolve `nowhere'"));
}

fn canonical(path: &std::path::Path) -> std::path::PathBuf {
  dunce::canonicalize(path).unwrap()
}
