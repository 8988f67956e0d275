//! Compile, link and batch steps.

use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn compile_runs_once_then_is_silent() {
  let env = TestEnv::new();
  env.old_file("main.c");

  env
    .kiln()
    .args(["compile", "main"])
    .assert()
    .success()
    .stdout("cc -c -o main.o main.c\ncompiling main.c\n");
  assert!(env.root().join("main.o").exists());

  env.kiln().args(["compile", "main"]).assert().success().stdout("");
}

#[test]
fn compile_passes_flags_through() {
  let env = TestEnv::new();
  env.old_file("main.c");
  env.old_file("util.h");

  env
    .kiln()
    .args(["--cflag=-O2", "--cflag=-Wall", "compile", "main", "--dep", "util"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("cc -O2 -Wall -c -o main.o main.c\n"));
}

#[test]
fn compile_missing_header_fails() {
  let env = TestEnv::new();
  env.old_file("main.c");

  env
    .kiln()
    .args(["compile", "main", "--dep", "nope"])
    .assert()
    .failure()
    .code(1)
    .stdout("")
    .stderr(predicate::str::contains("dependency `nope.h' does not exist"));
}

#[test]
fn compiler_failure_stops_the_run() {
  let env = TestEnv::new();
  env.old_file("fail.c");

  env
    .kiln()
    .args(["compile", "fail"])
    .assert()
    .failure()
    .code(1)
    .stdout(predicate::str::contains("fail.c: error: broken"))
    .stderr(predicate::str::contains("command exited with status 1: cc -c -o fail.o fail.c"));
}

#[test]
fn static_archive_invokes_archiver_once() {
  let env = TestEnv::new();
  env.old_file("a.o");
  env.old_file("b.o");

  env
    .kiln()
    .args(["link", "static", "foo", "a", "b"])
    .assert()
    .success()
    .stdout("ar -r libfoo.a a.o b.o\n");
  assert!(env.root().join("libfoo.a").exists());

  env
    .kiln()
    .args(["link", "static", "foo", "a", "b"])
    .assert()
    .success()
    .stdout("");
}

#[test]
fn executable_keeps_its_name() {
  let env = TestEnv::new();
  env.old_file("main.o");

  env
    .kiln()
    .args(["--lflag=-lm", "link", "exe", "app", "main"])
    .assert()
    .success()
    .stdout("cc -lm -o app main.o\ncompiling \n");
}

#[test]
fn batch_output_follows_submission_order() {
  let env = TestEnv::new();
  env.old_file("slow.c");
  env.old_file("fast.c");

  env
    .kiln()
    .args(["batch", "slow", "fast"])
    .assert()
    .success()
    .stdout(
      "cc -c -o slow.o slow.c\ncompiling slow.c\n\
       cc -c -o fast.o fast.c\ncompiling fast.c\n",
    );
  assert!(env.root().join("slow.o").exists());
  assert!(env.root().join("fast.o").exists());
}

#[test]
fn batch_failure_is_reported_and_fails_the_run() {
  let env = TestEnv::new();
  env.old_file("slow.c");
  env.old_file("fail.c");

  env
    .kiln()
    .args(["batch", "slow", "fail"])
    .assert()
    .failure()
    .code(1)
    .stdout(
      "cc -c -o slow.o slow.c\ncompiling slow.c\n\
       cc -c -o fail.o fail.c\nfail.c: error: broken\n",
    );
}

#[test]
fn batch_skips_fresh_objects() {
  let env = TestEnv::new();
  env.old_file("a.c");
  std::fs::write(env.root().join("a.o"), "").unwrap();
  env.old_file("b.c");

  env
    .kiln()
    .args(["batch", "a", "b"])
    .assert()
    .success()
    .stdout("cc -c -o b.o b.c\ncompiling b.c\n");
}
