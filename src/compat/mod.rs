//! Secondary-architecture output resolution and build orchestration.
//!
//! Work happens in two phases run by separate processes:
//!
//! - **setup**: [`matrix::resolve`] decides which extra binaries are needed and
//!   [`state::save`] records the decision in the build directory.
//! - **compile**: [`state::load`] reads it back, [`ArchBuilder`] drives the
//!   toolchain once per architecture, and [`depfile::generate`] describes the
//!   results for the outer build system.
//!
//! # Example
//!
//! ```no_run
//! use compat_build::compat::{self, AssetsMode, CompatSelection, ComponentSelection};
//!
//! let compat = CompatSelection::Auto.normalize("android");
//! let matrix = compat::matrix::resolve(
//!     "android",
//!     "arm64",
//!     &compat,
//!     AssetsMode::Embedded,
//!     &ComponentSelection::new(["gadget"]),
//! );
//! assert!(matrix.get("arm").is_some());
//! ```

pub mod builder;
pub mod depfile;
pub mod env;
mod error;
pub mod matrix;
pub mod options;
pub mod settings;
pub mod state;
pub mod utils;

pub use builder::{ArchBuilder, ScriptToolchain, Toolchain, ToolchainConfig};
pub use error::{Error, ErrorExt, Result};
pub use settings::{
    AssetsMode, CompatMode, CompatSelection, ComponentSelection, Output, OutputMatrix, Target,
};
pub use state::BuildState;
