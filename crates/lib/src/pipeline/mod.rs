//! The build/test/install driver.
//!
//! Each run performs exactly one mode, start to finish, and stops at the
//! first error. In build mode the stages run strictly in sequence:
//!
//! 1. create and assemble the workspace
//! 2. compile the executables
//! 3. build the secondary-language project
//! 4. collect binaries into the output directory
//!
//! Build and test hold the workspace lock for the whole run.

mod types;

pub use types::{BuildReport, InstallReport, Mode, PipelineError, PipelineReport, Stage};

use std::time::Instant;

use tracing::info;

use crate::artifacts;
use crate::config::BuildConfig;
use crate::toolchain::{Toolchain, ToolchainError};
use crate::workspace::Workspace;

pub struct Pipeline<'a, T: Toolchain + ?Sized> {
  config: &'a BuildConfig,
  toolchain: &'a T,
}

impl<'a, T: Toolchain + ?Sized> Pipeline<'a, T> {
  pub fn new(config: &'a BuildConfig, toolchain: &'a T) -> Self {
    Self { config, toolchain }
  }

  pub fn run(&self, mode: &Mode) -> Result<PipelineReport, PipelineError> {
    let start = Instant::now();
    info!(mode = mode.as_str(), root = %self.config.project_root.display(), "starting");

    let report = match mode {
      Mode::Build => PipelineReport::Build(self.build()?),
      Mode::Test => self.test()?,
      Mode::Install { prefix } => PipelineReport::Install(self.install(prefix.as_deref())?),
    };

    info!(mode = mode.as_str(), elapsed_ms = start.elapsed().as_millis() as u64, "finished");
    Ok(report)
  }

  fn build(&self) -> Result<BuildReport, PipelineError> {
    let workspace = Workspace::from_config(self.config);
    let _guard = workspace.lock().map_err(PipelineError::Lock)?;

    workspace.create()?;
    let staged = workspace.assemble(self.config)?;

    tool_stage(Stage::Compile, || {
      self.toolchain.install(&workspace, &self.config.executables)
    })?;
    tool_stage(Stage::Package, || {
      self.toolchain.package(&self.config.secondary_path())
    })?;

    let collected = artifacts::collect(&workspace, &self.config.output_path())?;

    Ok(BuildReport { staged, collected })
  }

  fn test(&self) -> Result<PipelineReport, PipelineError> {
    let workspace = Workspace::from_config(self.config);
    let _guard = workspace.lock().map_err(PipelineError::Lock)?;

    let package = &self.config.test_package;
    tool_stage(Stage::Test, || self.toolchain.test(&workspace, package))?;

    Ok(PipelineReport::Test {
      package: package.clone(),
    })
  }

  fn install(&self, prefix: Option<&std::path::Path>) -> Result<InstallReport, PipelineError> {
    let prefix = self.config.install_prefix(prefix);
    info!(prefix = %prefix.display(), "installing");

    let installed = artifacts::install(&self.config.output_path(), &prefix, &self.config.install.binaries)?;

    Ok(InstallReport { prefix, installed })
  }
}

fn tool_stage<F>(stage: Stage, f: F) -> Result<(), PipelineError>
where
  F: FnOnce() -> Result<(), ToolchainError>,
{
  info!(%stage, "stage started");
  f().map_err(|source| PipelineError::Toolchain { stage, source })?;
  info!(%stage, "stage finished");
  Ok(())
}
