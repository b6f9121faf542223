//! Command line interface for compat-build.
//!
//! This module parses arguments and dispatches to the `setup` and `compile`
//! phases.

mod args;
pub mod commands;

pub use args::{Args, Command, RuntimeConfig};

use crate::compat::env::process_env;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Runs an already-parsed invocation.
pub async fn execute(args: &Args) -> Result<i32> {
    let config = RuntimeConfig::from(args);

    match &args.command {
        Command::Setup {
            builddir,
            host_os,
            host_arch,
            compat,
            assets,
            components,
        } => {
            if let Some(line) =
                commands::setup(builddir, host_os, host_arch, compat, *assets, components)?
            {
                println!("{line}");
            }
        }
        Command::Compile {
            builddir,
            top_builddir,
        } => {
            args.validate_compile_dirs(builddir, top_builddir)?;
            let env = process_env();
            commands::compile(&config, builddir, top_builddir, &env).await?;
        }
    }

    Ok(0)
}
