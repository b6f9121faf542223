//! Secondary-architecture build pass for multi-binary distributions.
//!
//! Given a primary build's target OS and architecture, this library works out
//! which extra architecture variants of the helper, agent, gadget and server
//! binaries are needed, and drives the toolchain to produce them:
//! - Output matrix resolution (pure)
//! - Build state persistence between the setup and compile phases
//! - Per-architecture configure/build with a sanitized environment
//! - Make-compatible depfile generation
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod compat;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, CompatError, Result};
