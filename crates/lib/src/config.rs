//! Project configuration.
//!
//! A [`BuildConfig`] is built once at startup from the project root and the
//! optional `stagebuild.toml` inside it, then passed by reference to every
//! stage. Every field has a default, so a project without a config file gets
//! the stock layout:
//!
//! ```text
//! deps/              dependency trees, already laid out by import path
//! tmp/{src,bin,pkg}  workspace handed to the compiler
//! bin/               collected binaries
//! gauge-java/        secondary-language project
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::{CONFIG_FILENAME, DEFAULT_INSTALL_PREFIX};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to resolve project root {path}: {source}")]
  ProjectRoot {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Immutable description of the project being built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
  /// Absolute project root; every relative path below resolves against it.
  #[serde(skip)]
  pub project_root: PathBuf,

  /// Directory of dependency trees mirrored flat into the workspace source root.
  pub deps_dir: PathBuf,

  /// Transient workspace handed to the compiler.
  pub workspace_dir: PathBuf,

  /// Where built binaries are collected.
  pub output_dir: PathBuf,

  /// Library packages staged into the workspace source root.
  pub packages: Vec<String>,

  /// Executables staged into the workspace and compiled.
  pub executables: Vec<String>,

  /// Package run in test mode.
  pub test_package: String,

  /// Secondary-language project, built in place by the package tool.
  pub secondary_dir: PathBuf,

  pub install: InstallConfig,

  pub toolchain: ToolchainConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallConfig {
  /// Binaries copied from the output directory into `<prefix>/bin`.
  pub binaries: Vec<String>,

  /// Prefix used when none is given on the command line.
  pub default_prefix: PathBuf,
}

/// External programs and the verbs passed to them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
  pub compiler: String,

  /// Environment variable that tells the compiler where the workspace is.
  pub workspace_env: String,

  /// Arguments for the compile verb; executable names are appended.
  pub install_args: Vec<String>,

  /// Arguments for the test verb; the test package is appended.
  pub test_args: Vec<String>,

  pub package_tool: String,
  pub package_args: Vec<String>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      project_root: PathBuf::from("."),
      deps_dir: PathBuf::from("deps"),
      workspace_dir: PathBuf::from("tmp"),
      output_dir: PathBuf::from("bin"),
      packages: vec!["common".to_string()],
      executables: vec!["gauge".to_string(), "gauge-java".to_string()],
      test_package: "gauge".to_string(),
      secondary_dir: PathBuf::from("gauge-java"),
      install: InstallConfig::default(),
      toolchain: ToolchainConfig::default(),
    }
  }
}

impl Default for InstallConfig {
  fn default() -> Self {
    Self {
      binaries: vec!["gauge".to_string(), "gauge-java".to_string()],
      default_prefix: PathBuf::from(DEFAULT_INSTALL_PREFIX),
    }
  }
}

impl Default for ToolchainConfig {
  fn default() -> Self {
    Self {
      compiler: "go".to_string(),
      workspace_env: "GOPATH".to_string(),
      install_args: vec!["install".to_string(), "-v".to_string()],
      test_args: vec!["test".to_string()],
      package_tool: "ant".to_string(),
      package_args: vec!["jar".to_string()],
    }
  }
}

impl BuildConfig {
  /// Load the configuration for the project rooted at `project_root`.
  ///
  /// The root is canonicalized so that every derived path is absolute. A
  /// missing `stagebuild.toml` yields the defaults.
  pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
    let root = dunce::canonicalize(project_root).map_err(|e| ConfigError::ProjectRoot {
      path: project_root.to_path_buf(),
      source: e,
    })?;

    let config_path = root.join(CONFIG_FILENAME);
    let mut config = if config_path.is_file() {
      debug!(path = %config_path.display(), "loading config");
      let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Read {
        path: config_path.clone(),
        source: e,
      })?;
      Self::from_toml(&content).map_err(|e| ConfigError::Parse {
        path: config_path.clone(),
        source: e,
      })?
    } else {
      debug!(root = %root.display(), "no config file, using defaults");
      Self::default()
    };

    config.project_root = root;
    Ok(config)
  }

  /// Parse a config document. The project root is left at its default.
  pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    self.project_root.join(path)
  }

  pub fn deps_path(&self) -> PathBuf {
    self.resolve(&self.deps_dir)
  }

  pub fn workspace_path(&self) -> PathBuf {
    self.resolve(&self.workspace_dir)
  }

  pub fn output_path(&self) -> PathBuf {
    self.resolve(&self.output_dir)
  }

  pub fn secondary_path(&self) -> PathBuf {
    self.resolve(&self.secondary_dir)
  }

  /// Source directory of a package or executable inside the project.
  pub fn source_path(&self, name: &str) -> PathBuf {
    self.project_root.join(name)
  }

  /// Every name staged into the workspace: packages first, then executables.
  pub fn staged_names(&self) -> impl Iterator<Item = &str> {
    self
      .packages
      .iter()
      .chain(self.executables.iter())
      .map(String::as_str)
  }

  /// The prefix to install into, falling back to the configured default
  /// when `requested` is absent or empty.
  pub fn install_prefix(&self, requested: Option<&Path>) -> PathBuf {
    match requested {
      Some(prefix) if !prefix.as_os_str().is_empty() => prefix.to_path_buf(),
      _ => self.install.default_prefix.clone(),
    }
  }
}
