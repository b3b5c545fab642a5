//! stagebuild-lib: Core logic for stagebuild
//!
//! This crate provides the building blocks of the staged build pipeline:
//! - `mirror`: metadata-driven incremental copying of files and trees
//! - `workspace`: assembly of the build workspace from source trees
//! - `toolchain`: invocation of the external compiler and package tools
//! - `artifacts`: collection and installation of produced binaries
//! - `pipeline`: the build/test/install driver that sequences the above

pub mod artifacts;
pub mod config;
pub mod consts;
pub mod mirror;
pub mod pipeline;
pub mod toolchain;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testutil;
