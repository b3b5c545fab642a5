//! Per-mode commands.
//!
//! Every mode goes through the same pipeline; the modules here only differ
//! in how they summarize a successful run.

mod build;
mod install;

use std::time::Instant;

use anyhow::{Context, Result};

use stagebuild_lib::config::BuildConfig;
use stagebuild_lib::pipeline::{Mode, Pipeline, PipelineReport};
use stagebuild_lib::toolchain::ProcessToolchain;

/// Run one pipeline mode against the project and print its summary.
pub fn cmd_run(config: &BuildConfig, mode: &Mode) -> Result<()> {
  let start = Instant::now();
  let toolchain = ProcessToolchain::new(config.toolchain.clone());

  let report = Pipeline::new(config, &toolchain)
    .run(mode)
    .with_context(|| format!("{} failed", capitalize(mode.as_str())))?;

  match report {
    PipelineReport::Build(report) => build::print_report(&report, start.elapsed()),
    PipelineReport::Test { package } => run_tests::print_report(&package, start.elapsed()),
    PipelineReport::Install(report) => install::print_report(&report),
  }

  Ok(())
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
