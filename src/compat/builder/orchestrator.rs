//! Multi-architecture build orchestration.
//!
//! This module provides the [`ArchBuilder`] that replays a saved
//! [`BuildState`] against the toolchain, one secondary architecture at a time.

use crate::compat::{
    depfile::{self, DEPFILE_FILENAME},
    env::{EnvMap, HostPlatform, scrub},
    error::{ErrorExt, Result},
    options::{OptionStore, select_forwardable_options},
    settings::Output,
    state::{BuildState, workdir_for_arch},
    utils::fs::{absolute, copy_file},
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::compile_db;
use super::toolchain::Toolchain;

/// Variable telling the configure script which directory to set up.
pub const BUILDDIR_ENVVAR: &str = "FRIDA_BUILDDIR";

/// Manifest whose presence marks a work directory as configured.
pub const BUILD_MANIFEST_FILENAME: &str = "build.ninja";

/// Variant selections blanked on every secondary build, which picks its own.
const VARIANT_OPTIONS: &[&str] = &[
    "helper_modern",
    "helper_legacy",
    "agent_modern",
    "agent_legacy",
    "agent_emulated_modern",
    "agent_emulated_legacy",
];

/// Drives the toolchain for every secondary architecture in a [`BuildState`].
///
/// Architectures are processed sequentially; the first failure aborts the rest.
pub struct ArchBuilder<'a, T, S> {
    toolchain: &'a T,
    option_store: &'a S,
    env: EnvMap,
}

impl<'a, T: Toolchain, S: OptionStore> ArchBuilder<'a, T, S> {
    /// Creates a builder whose child processes start from `env`, scrubbed for `platform`.
    pub fn new(toolchain: &'a T, option_store: &'a S, env: &EnvMap, platform: HostPlatform) -> Self {
        Self {
            toolchain,
            option_store,
            env: scrub(env, platform),
        }
    }

    /// Builds every architecture, copies outputs into `build_dir` and returns
    /// the sources that went into them.
    pub async fn build(
        &self,
        state: &BuildState,
        build_dir: &Path,
        top_build_dir: &Path,
    ) -> Result<BTreeSet<PathBuf>> {
        let build_dir = absolute(build_dir)?;
        let mut source_paths = BTreeSet::new();
        let mut options: Option<Vec<String>> = None;

        for group in state.outputs.iter() {
            let arch = group.arch.as_str();
            let workdir = workdir_for_arch(arch, &build_dir);
            let build_env = self.build_environment(&workdir);
            log::info!("Building {} output(s) for {}-{}", group.outputs.len(), state.host_os, arch);

            if workdir.join(BUILD_MANIFEST_FILENAME).exists() {
                log::info!("{} already configured, skipping configure", workdir.display());
            } else {
                if options.is_none() {
                    options = Some(select_forwardable_options(self.option_store, top_build_dir).await?);
                }
                let flags = configure_flags(options.as_deref().unwrap_or_default());
                std::fs::create_dir_all(&workdir).fs_context("creating work directory", &workdir)?;
                let host = format!("{}-{}", state.host_os, arch);
                self.toolchain.configure(&workdir, &host, &flags, &build_env).await?;
            }

            let targets = distinct_targets(&group.outputs);
            self.toolchain.build(&workdir, &targets, &build_env).await?;

            for output in &group.outputs {
                copy_file(
                    &workdir.join(&output.source_relative_path),
                    &build_dir.join(&output.display_name),
                )
                .await?;
            }

            source_paths.extend(compile_db::source_files(&workdir)?);
        }

        Ok(source_paths)
    }

    /// Runs [`build`](Self::build) and writes the depfile. Returns its path.
    pub async fn compile(&self, state: &BuildState, build_dir: &Path, top_build_dir: &Path) -> Result<PathBuf> {
        let source_paths = self.build(state, build_dir, top_build_dir).await?;

        let text = depfile::generate(state.outputs.all_outputs(), &source_paths, build_dir, top_build_dir)?;
        let path = build_dir.join(DEPFILE_FILENAME);
        std::fs::write(&path, text).fs_context("writing depfile", &path)?;

        log::info!("Wrote {} ({} sources)", path.display(), source_paths.len());
        Ok(path)
    }

    fn build_environment(&self, workdir: &Path) -> EnvMap {
        let mut env = self.env.clone();
        env.insert(BUILDDIR_ENVVAR.to_string(), workdir.display().to_string());
        env
    }
}

/// Configure flags: blanked variant selections followed by forwarded options.
fn configure_flags(forwarded: &[String]) -> Vec<String> {
    VARIANT_OPTIONS
        .iter()
        .map(|name| format!("-D{name}="))
        .chain(forwarded.iter().cloned())
        .collect()
}

/// Build targets for `outputs`, first occurrence order, without duplicates.
fn distinct_targets(outputs: &[Output]) -> Vec<&'static str> {
    let mut targets = Vec::new();
    for output in outputs {
        let target = output.target.build_target();
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}
