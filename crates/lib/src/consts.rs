pub const APP_NAME: &str = "stagebuild";

/// Project configuration file, looked up in the project root.
pub const CONFIG_FILENAME: &str = "stagebuild.toml";

/// Lock file created inside the workspace directory.
pub const LOCK_FILENAME: &str = ".lock";

/// Fixed subdirectories of the workspace.
pub const WORKSPACE_SRC_DIR: &str = "src";
pub const WORKSPACE_BIN_DIR: &str = "bin";
pub const WORKSPACE_PKG_DIR: &str = "pkg";

/// Subdirectory of the install prefix that receives binaries.
pub const INSTALL_BIN_DIR: &str = "bin";

pub const DEFAULT_INSTALL_PREFIX: &str = "/usr/local";

/// Permission bits for directories created while mirroring.
pub const DIR_MODE: u32 = 0o755;
