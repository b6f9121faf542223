//! Persisted result of the setup phase.
//!
//! `setup` and `compile` run in different processes, possibly long apart, so the
//! resolved matrix is stored inside the build directory's private namespace and
//! read back by `compile`.

use super::error::{Error, ErrorExt, Result};
use super::settings::OutputMatrix;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the private directory inside the build directory.
pub const PRIVATE_DIR_NAME: &str = "arch-support.p";

/// Name of the state file inside the private directory.
pub const STATE_FILENAME: &str = "state.json";

/// Schema version written by this build. Bump when the layout changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Decision recorded by `setup`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BuildState {
    /// Primary build's target OS.
    pub host_os: String,
    /// Primary build's target architecture.
    pub host_arch: String,
    /// Outputs per secondary architecture.
    pub outputs: OutputMatrix,
}

#[derive(Serialize, Deserialize)]
struct StateFile {
    schema_version: u32,
    #[serde(flatten)]
    state: BuildState,
}

#[derive(Deserialize)]
struct VersionProbe {
    schema_version: u32,
}

/// Private namespace for `build_dir`.
pub fn private_dir(build_dir: &Path) -> PathBuf {
    build_dir.join(PRIVATE_DIR_NAME)
}

/// Work directory for one secondary architecture.
pub fn workdir_for_arch(arch: &str, build_dir: &Path) -> PathBuf {
    private_dir(build_dir).join(arch)
}

/// Writes `state` for `build_dir`, replacing any previous state.
pub fn save(build_dir: &Path, state: &BuildState) -> Result<()> {
    let dir = private_dir(build_dir);
    std::fs::create_dir_all(&dir).fs_context("creating private directory", &dir)?;

    let path = dir.join(STATE_FILENAME);
    let file = StateFile {
        schema_version: SCHEMA_VERSION,
        state: state.clone(),
    };
    let contents = serde_json::to_vec_pretty(&file)?;
    std::fs::write(&path, contents).fs_context("writing build state", &path)?;

    log::debug!("Saved build state to {}", path.display());
    Ok(())
}

/// Reads the state saved by [`save`] for `build_dir`.
pub fn load(build_dir: &Path) -> Result<BuildState> {
    let path = private_dir(build_dir).join(STATE_FILENAME);
    let contents = match std::fs::read(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::StateMissing { path });
        }
        Err(e) => return Err(e).fs_context("reading build state", &path),
    };

    let probe: VersionProbe = serde_json::from_slice(&contents)?;
    if probe.schema_version != SCHEMA_VERSION {
        return Err(Error::StateVersionMismatch {
            found: probe.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let file: StateFile = serde_json::from_slice(&contents)?;
    Ok(file.state)
}
