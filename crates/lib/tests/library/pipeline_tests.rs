//! End-to-end pipeline runs against shell stand-ins for the toolchain.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;

use stagebuild_lib::pipeline::{Mode, Pipeline, PipelineError, PipelineReport, Stage};
use stagebuild_lib::toolchain::ProcessToolchain;

use super::common::{COMPILE_FAIL, COMPILE_OK, TestProject, shell_toolchain_toml};

#[test]
fn build_compiles_packages_and_collects() {
  let project = TestProject::new();
  let config = project.config(&shell_toolchain_toml(COMPILE_OK));
  let toolchain = ProcessToolchain::new(config.toolchain.clone());

  let report = Pipeline::new(&config, &toolchain).run(&Mode::Build).unwrap();

  let PipelineReport::Build(report) = report else {
    panic!("expected build report");
  };
  assert_eq!(report.staged.copied, 6);
  assert_eq!(report.collected.output_dir, config.output_path());
  assert!(config.output_path().join("gauge").is_file());
  assert!(config.output_path().join("gauge-java").is_file());
  assert!(config.project_root.join("packaged").exists());

  let gopath = std::fs::read_to_string(config.workspace_path().join("gopath")).unwrap();
  assert_eq!(gopath.trim(), config.workspace_path().to_str().unwrap());
}

#[test]
fn unchanged_rebuild_stages_zero_files() {
  let project = TestProject::new();
  let config = project.config(&shell_toolchain_toml(COMPILE_OK));
  let toolchain = ProcessToolchain::new(config.toolchain.clone());
  let pipeline = Pipeline::new(&config, &toolchain);

  let PipelineReport::Build(first) = pipeline.run(&Mode::Build).unwrap() else {
    panic!("expected build report");
  };
  let PipelineReport::Build(second) = pipeline.run(&Mode::Build).unwrap() else {
    panic!("expected build report");
  };

  assert_eq!(second.staged.copied, 0);
  assert_eq!(second.staged.unchanged, first.staged.copied);
  assert_eq!(first.collected.output_dir, second.collected.output_dir);
}

#[test]
fn compile_failure_stops_pipeline() {
  let project = TestProject::new();
  let config = project.config(&shell_toolchain_toml(COMPILE_FAIL));
  let toolchain = ProcessToolchain::new(config.toolchain.clone());

  let err = Pipeline::new(&config, &toolchain).run(&Mode::Build).unwrap_err();

  assert!(matches!(
    err,
    PipelineError::Toolchain {
      stage: Stage::Compile,
      ..
    }
  ));
  assert!(!config.project_root.join("packaged").exists());
  assert!(!config.output_path().exists());
}

#[test]
fn test_mode_runs_compiler_test_verb() {
  let project = TestProject::new();
  let config = project.config(&shell_toolchain_toml(COMPILE_OK));
  let toolchain = ProcessToolchain::new(config.toolchain.clone());

  Pipeline::new(&config, &toolchain).run(&Mode::Test).unwrap();

  let tested = std::fs::read_to_string(config.workspace_path().join("tested")).unwrap();
  assert_eq!(tested.trim(), "gauge");
  assert!(!config.output_path().exists());
}

#[test]
fn install_with_default_prefix_sets_executable_bits() {
  let project = TestProject::new();
  let prefix = project.path("usr-local");
  let toml = format!(
    "{}\n[install]\ndefault_prefix = \"{}\"\n",
    shell_toolchain_toml(COMPILE_OK),
    prefix.display()
  );
  let config = project.config(&toml);
  let toolchain = ProcessToolchain::new(config.toolchain.clone());
  let pipeline = Pipeline::new(&config, &toolchain);

  pipeline.run(&Mode::Build).unwrap();
  let PipelineReport::Install(report) = pipeline.run(&Mode::Install { prefix: None }).unwrap() else {
    panic!("expected install report");
  };

  assert_eq!(report.prefix, prefix);
  for name in ["gauge", "gauge-java"] {
    let installed = prefix.join("bin").join(name);
    let mode = std::fs::metadata(&installed).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111, "{name} should be executable");
  }
}
