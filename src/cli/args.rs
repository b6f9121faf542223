//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap. The `compat` and
//! `components` lists are parsed by value parsers, so malformed combinations
//! are rejected as usage errors before anything runs.

use crate::compat::builder::toolchain::ToolchainConfig;
use crate::compat::utils::fs::relative_path;
use crate::compat::{AssetsMode, CompatSelection, ComponentSelection};
use crate::error::CliError;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Secondary-architecture build pass
#[derive(Parser, Debug)]
#[command(
    name = "compat-build",
    version,
    about = "Builds extra architecture variants of helper, agent, gadget and server binaries",
    long_about = "Resolves which extra architecture variants a build needs and drives the toolchain to produce them.

Two phases, run as separate invocations:
  compat-build setup <builddir> <host_os> <host_arch> <compat> <assets> <components>
  compat-build compile <builddir> <top_builddir>

`setup` prints `<identifiers> <file names> compat.deps` when there is work to do
and nothing otherwise. `compile` builds every recorded architecture and writes
compat.deps into <builddir>."
)]
pub struct Args {
    /// Source tree containing the configure script
    #[arg(long, global = true, env = "COMPAT_SOURCE_ROOT", value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Program used to read the primary build's options
    #[arg(long, global = true, env = "MESON", default_value = "meson", value_name = "PROGRAM")]
    pub meson: PathBuf,

    /// Build command used on non-Windows hosts
    #[arg(long, global = true, env = "MAKE", default_value = "make", value_name = "PROGRAM")]
    pub make: PathBuf,

    /// Phase to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve required outputs and record them for `compile`
    Setup {
        /// Build directory
        builddir: PathBuf,
        /// Operating system binaries are being built for
        host_os: String,
        /// Architecture binaries are being built for
        host_arch: String,
        /// Support for targets with a different architecture (native, emulated, auto, disabled)
        #[arg(value_parser = clap::value_parser!(CompatSelection))]
        compat: CompatSelection,
        /// Whether assets are embedded or installed and loaded at runtime
        #[arg(value_parser = clap::value_parser!(AssetsMode))]
        assets: AssetsMode,
        /// Which components will be built
        #[arg(value_parser = clap::value_parser!(ComponentSelection))]
        components: ComponentSelection,
    },

    /// Build every recorded architecture and write the depfile
    Compile {
        /// Build directory
        builddir: PathBuf,
        /// Top build directory
        top_builddir: PathBuf,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks that the build directory lives inside the top build directory,
    /// which the depfile's output paths are relative to.
    pub fn validate_compile_dirs(&self, builddir: &Path, top_builddir: &Path) -> Result<(), CliError> {
        let inside = relative_path(builddir, top_builddir)
            .ok()
            .flatten()
            .is_some_and(|rel| !rel.starts_with(".."));
        if inside {
            Ok(())
        } else {
            Err(CliError::InvalidArguments {
                reason: format!(
                    "build directory {} is not inside top build directory {}",
                    builddir.display(),
                    top_builddir.display()
                ),
            })
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    toolchain: ToolchainConfig,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let source_root = args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            toolchain: ToolchainConfig {
                source_root,
                make: args.make.clone(),
                meson: args.meson.clone(),
            },
        }
    }
}

impl RuntimeConfig {
    /// Toolchain entry points
    pub fn toolchain(&self) -> &ToolchainConfig {
        &self.toolchain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_setup() {
        let args = Args::try_parse_from([
            "compat-build",
            "setup",
            "build",
            "android",
            "arm64",
            "native",
            "embedded",
            "gadget,server",
        ])
        .unwrap();

        match args.command {
            Command::Setup { compat, assets, components, .. } => {
                assert_eq!(compat, CompatSelection::Modes(["native".to_string()].into()));
                assert_eq!(assets, AssetsMode::Embedded);
                assert!(components.contains("server"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_auto_with_native() {
        let res = Args::try_parse_from([
            "compat-build", "setup", "build", "linux", "x86_64", "auto,native", "embedded", "",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn compile_dirs_must_nest() {
        let args = Args::try_parse_from(["compat-build", "compile", "b", "."]).unwrap();
        assert!(args.validate_compile_dirs(Path::new("/top/sub"), Path::new("/top")).is_ok());
        assert!(args.validate_compile_dirs(Path::new("/top"), Path::new("/top")).is_ok());
        assert!(args.validate_compile_dirs(Path::new("/other"), Path::new("/top")).is_err());
    }

    #[test]
    fn runtime_config_uses_flags() {
        let args = Args::try_parse_from([
            "compat-build",
            "--source-root",
            "/src/frida",
            "--make",
            "gmake",
            "compile",
            "build",
            ".",
        ])
        .unwrap();

        let config = RuntimeConfig::from(&args);
        assert_eq!(config.toolchain().source_root, PathBuf::from("/src/frida"));
        assert_eq!(config.toolchain().make, PathBuf::from("gmake"));
    }
}
