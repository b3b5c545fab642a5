use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stagebuild_lib::config::BuildConfig;
use stagebuild_lib::pipeline::Mode;

mod cmd;
mod output;

/// stagebuild - stage sources into a workspace, run the toolchain, collect binaries
#[derive(Parser)]
#[command(name = "stagebuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Run the test cases instead of building
  #[arg(long, conflicts_with = "install")]
  test: bool,

  /// Install built binaries to the prefix instead of building
  #[arg(long)]
  install: bool,

  /// Prefix to install into; empty means the configured default (/usr/local)
  #[arg(long, value_name = "DIR")]
  prefix: Option<String>,

  /// Project root containing the sources and stagebuild.toml
  #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
  project_dir: PathBuf,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn mode(&self) -> Mode {
    if self.test {
      Mode::Test
    } else if self.install {
      Mode::Install {
        prefix: self.prefix.as_ref().map(PathBuf::from),
      }
    } else {
      Mode::Build
    }
  }
}

/// Long flags also accepted with a single dash, for existing build scripts.
const SINGLE_DASH_FLAGS: [&str; 3] = ["test", "install", "prefix"];

/// Rewrite `-test`, `-install`, `-prefix` (and `-prefix=DIR`) to their
/// double-dash forms. Arguments after `--` are left alone.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
  I: IntoIterator<Item = OsString>,
{
  let mut passthrough = false;
  args
    .into_iter()
    .map(|arg| {
      if passthrough {
        return arg;
      }
      let Some(text) = arg.to_str() else {
        return arg;
      };
      if text == "--" {
        passthrough = true;
        return arg;
      }
      match text.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => {
          let name = rest.split_once('=').map_or(rest, |(name, _)| name);
          if SINGLE_DASH_FLAGS.contains(&name) {
            OsString::from(format!("-{text}"))
          } else {
            arg
          }
        }
        _ => arg,
      }
    })
    .collect()
}

fn main() -> Result<()> {
  let cli = Cli::parse_from(normalize_args(std::env::args_os()));

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = BuildConfig::load(&cli.project_dir).context("Failed to load project configuration")?;
  debug!(root = %config.project_root.display(), "configuration loaded");

  cmd::cmd_run(&config, &cli.mode())
}
