//! Build and test mode integration tests.

use predicates::prelude::*;

use super::common::{COMPILE_FAIL, COMPILE_OK, TestEnv};

#[test]
fn build_collects_binaries() {
  let env = TestEnv::new(COMPILE_OK);

  env
    .stagebuild_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete"))
    .stdout(predicate::str::contains("Files copied: 4"))
    .stderr(predicate::str::contains("Execute [/bin/sh -c"))
    .stderr(predicate::str::contains("Binaries are available at"));

  assert!(env.path("bin/gauge").is_file());
  assert!(env.path("bin/gauge-java").is_file());
  assert!(env.path("tmp/src/github.com/acme/util/util.go").is_file());
  assert!(env.path("tmp/pkg").is_dir());
}

#[test]
fn rebuild_without_changes_copies_nothing() {
  let env = TestEnv::new(COMPILE_OK);

  env.stagebuild_cmd().assert().success();

  env
    .stagebuild_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Files copied: 0"))
    .stdout(predicate::str::contains("Files unchanged: 4"));
}

#[test]
fn compile_failure_aborts_build() {
  let env = TestEnv::new(COMPILE_FAIL);

  env
    .stagebuild_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("syntax error"))
    .stderr(predicate::str::contains("compile stage failed"));

  assert!(!env.path("bin").exists());
}

#[test]
fn missing_compiler_aborts_build() {
  let env = TestEnv::new(COMPILE_OK);
  env.write_file(
    "stagebuild.toml",
    "[toolchain]\ncompiler = \"stagebuild-missing-compiler\"\n",
  );

  env
    .stagebuild_cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to start"));
}

#[test]
fn test_mode_runs_tests_only() {
  let env = TestEnv::new(COMPILE_OK);

  env
    .stagebuild_cmd()
    .arg("--test")
    .assert()
    .success()
    .stdout(predicate::str::contains("Tests passed for gauge"));

  assert!(!env.path("bin").exists());
  assert!(!env.path("tmp/src").exists());
}

#[test]
fn verbose_logs_per_file_decisions() {
  let env = TestEnv::new(COMPILE_OK);

  env.stagebuild_cmd().assert().success();

  env
    .stagebuild_cmd()
    .arg("--verbose")
    .assert()
    .success()
    .stderr(predicate::str::contains("unchanged"));
}
