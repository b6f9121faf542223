//! Output descriptors and the per-architecture output matrix.

use super::Target;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file to produce for one secondary architecture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Build-system variable name, unique within its architecture group.
    pub identifier: String,
    /// File name placed in the shared output directory.
    pub display_name: String,
    /// Where the toolchain writes the file, relative to the work directory.
    pub source_relative_path: PathBuf,
    /// Target to request from the build step.
    pub target: Target,
}

impl Output {
    /// Token naming the target, e.g. `agent`.
    pub fn target_name(&self) -> &'static str {
        self.target.name()
    }
}

/// Outputs required for one secondary architecture.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ArchOutputs {
    /// Secondary architecture, e.g. `x86` or `arm64e`.
    pub arch: String,
    /// Outputs in the order they were resolved.
    pub outputs: Vec<Output>,
}

/// Insertion-ordered mapping from secondary architecture to its outputs.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputMatrix {
    groups: Vec<ArchOutputs>,
}

impl OutputMatrix {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `outputs` to the group for `arch`, creating it if needed.
    pub fn extend(&mut self, arch: &str, outputs: impl IntoIterator<Item = Output>) {
        match self.groups.iter_mut().find(|g| g.arch == arch) {
            Some(group) => group.outputs.extend(outputs),
            None => self.groups.push(ArchOutputs {
                arch: arch.to_string(),
                outputs: outputs.into_iter().collect(),
            }),
        }
    }

    /// Outputs for `arch`, if any rule fired for it.
    pub fn get(&self, arch: &str) -> Option<&[Output]> {
        self.groups
            .iter()
            .find(|g| g.arch == arch)
            .map(|g| g.outputs.as_slice())
    }

    /// Architecture groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ArchOutputs> {
        self.groups.iter()
    }

    /// All outputs across all architectures, group by group.
    pub fn all_outputs(&self) -> impl Iterator<Item = &Output> {
        self.groups.iter().flat_map(|g| g.outputs.iter())
    }

    /// Whether nothing needs to be built.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.outputs.is_empty())
    }
}
