//! Secondary-architecture build driving.
//!
//! # Overview
//!
//! For every architecture in a saved [`BuildState`](crate::compat::BuildState)
//! the [`ArchBuilder`]:
//! 1. Configures a private work directory once (skipped when its
//!    `build.ninja` already exists)
//! 2. Builds only the targets that architecture needs
//! 3. Copies the products into the shared build directory
//! 4. Collects compiled sources from `compile_commands.json`
//!
//! # Module Organization
//!
//! - [`compile_db`] - Compilation database reading
//! - [`orchestrator`] - The [`ArchBuilder`] itself
//! - [`toolchain`] - Configure/build subprocess invocation

pub mod compile_db;
mod orchestrator;
pub mod toolchain;

pub use orchestrator::{ArchBuilder, BUILD_MANIFEST_FILENAME, BUILDDIR_ENVVAR};
pub use toolchain::{ScriptToolchain, Toolchain, ToolchainConfig};
