//! `compile` phase: replay the saved state against the toolchain.

use crate::cli::RuntimeConfig;
use crate::compat::env::{EnvMap, HostPlatform};
use crate::compat::options::MesonIntrospection;
use crate::compat::{ArchBuilder, ScriptToolchain, state};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Builds every architecture recorded for `build_dir` and writes its depfile.
pub async fn compile(
    config: &RuntimeConfig,
    build_dir: &Path,
    top_build_dir: &Path,
    env: &EnvMap,
) -> Result<PathBuf> {
    let state = state::load(build_dir)?;

    let toolchain = ScriptToolchain::new(config.toolchain().clone());
    let option_store = MesonIntrospection::new(&config.toolchain().meson);
    let builder = ArchBuilder::new(&toolchain, &option_store, env, HostPlatform::current());

    Ok(builder.compile(&state, build_dir, top_build_dir).await?)
}
