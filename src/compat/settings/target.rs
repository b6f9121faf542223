//! Build targets a secondary architecture can be asked to produce.

use serde::{Deserialize, Serialize};

/// One of the binaries that may need an extra architecture variant.
///
/// The lowercase token (`helper`, `agent`, ...) is what appears in the output
/// matrix; the toolchain knows the same target as `frida-<token>`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Privileged helper process
    Helper,
    /// Injectable agent library
    Agent,
    /// Embeddable agent variant
    Gadget,
    /// Standalone server
    Server,
}

impl Target {
    /// Token used in identifiers and in the matrix.
    pub fn name(self) -> &'static str {
        match self {
            Self::Helper => "helper",
            Self::Agent => "agent",
            Self::Gadget => "gadget",
            Self::Server => "server",
        }
    }

    /// Target name understood by the build step.
    pub fn build_target(self) -> &'static str {
        match self {
            Self::Helper => "frida-helper",
            Self::Agent => "frida-agent",
            Self::Gadget => "frida-gadget",
            Self::Server => "frida-server",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
