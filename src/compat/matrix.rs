//! Output matrix resolution.
//!
//! Maps the primary build's platform and the requested compatibility modes to
//! the set of extra binaries each secondary architecture must provide. Pure and
//! deterministic: no I/O, no environment access.

use super::settings::{
    AssetsMode, BinaryFormat, CompatMode, ComponentSelection, Output, OutputMatrix, Target,
    artifact_file_name, artifact_path, qualified_file_name,
};
use std::collections::BTreeSet;

const APPLE_OSES: &[&str] = &["macos", "ios", "tvos"];

/// Resolves which outputs each secondary architecture needs.
///
/// `compat` must already be normalized (see
/// [`CompatSelection::normalize`](super::settings::CompatSelection::normalize)).
/// An empty result means there is nothing to do.
pub fn resolve(
    host_os: &str,
    host_arch: &str,
    compat: &BTreeSet<CompatMode>,
    assets: AssetsMode,
    components: &ComponentSelection,
) -> OutputMatrix {
    let mut matrix = OutputMatrix::new();

    if compat.contains(&CompatMode::Native) {
        resolve_native(&mut matrix, host_os, host_arch, assets, components);
    }

    if compat.contains(&CompatMode::Emulated) {
        resolve_emulated(&mut matrix, host_os, host_arch);
    }

    matrix
}

fn resolve_native(
    matrix: &mut OutputMatrix,
    host_os: &str,
    host_arch: &str,
    assets: AssetsMode,
    components: &ComponentSelection,
) {
    let format = BinaryFormat::for_os(host_os);
    let wants_gadget = components.contains("gadget");

    match (host_os, host_arch) {
        ("windows", "x86_64" | "x86") => {
            let (other_arch, kind) = counterpart(host_arch, ("x86_64", "x86"));
            let mut outputs = vec![
                plain(Target::Helper, kind, format),
                plain(Target::Agent, kind, format),
            ];
            if wants_gadget {
                outputs.push(plain(Target::Gadget, kind, format));
            }
            matrix.extend(other_arch, outputs);
        }
        (os, "arm64e" | "arm64") if APPLE_OSES.contains(&os) => {
            let (other_arch, kind) = counterpart(host_arch, ("arm64e", "arm64"));
            let mut outputs = vec![
                qualified(Target::Helper, kind, format, other_arch),
                qualified(Target::Agent, kind, format, other_arch),
            ];
            if wants_gadget {
                outputs.push(qualified(Target::Gadget, kind, format, other_arch));
            }
            if components.contains("server") && assets == AssetsMode::Installed {
                outputs.push(qualified(Target::Server, kind, format, other_arch));
            }
            matrix.extend(other_arch, outputs);
        }
        ("linux", "x86_64" | "x86") => {
            let (other_arch, kind) = counterpart(host_arch, ("x86_64", "x86"));
            // helper/agent are always published as the legacy variant on Linux
            let mut outputs = vec![
                plain(Target::Helper, Kind::Legacy, format),
                plain(Target::Agent, Kind::Legacy, format),
            ];
            if wants_gadget {
                outputs.push(plain(Target::Gadget, kind, format));
            }
            matrix.extend(other_arch, outputs);
        }
        ("android", "arm64" | "x86_64") => {
            let other_arch = if host_arch == "arm64" { "arm" } else { "x86" };
            let mut outputs = vec![
                plain(Target::Helper, Kind::Legacy, format),
                plain(Target::Agent, Kind::Legacy, format),
            ];
            if wants_gadget {
                outputs.push(plain(Target::Gadget, Kind::Legacy, format));
            }
            matrix.extend(other_arch, outputs);
        }
        _ => {}
    }
}

fn resolve_emulated(matrix: &mut OutputMatrix, host_os: &str, host_arch: &str) {
    if host_os != "android" || !matches!(host_arch, "x86_64" | "x86") {
        return;
    }

    matrix.extend("arm", [emulated_agent(Kind::Legacy, "arm")]);
    if host_arch == "x86_64" {
        matrix.extend("arm64", [emulated_agent(Kind::Modern, "arm64")]);
    }
}

/// Label distinguishing the two members of an architecture pair.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Kind {
    Modern,
    Legacy,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Legacy => "legacy",
        }
    }
}

/// Returns the other member of `(modern, legacy)` and its kind.
fn counterpart<'a>(host_arch: &str, (modern, legacy): (&'a str, &'a str)) -> (&'a str, Kind) {
    if host_arch == modern {
        (legacy, Kind::Legacy)
    } else {
        (modern, Kind::Modern)
    }
}

fn identifier(target: Target, kind: Kind) -> String {
    format!("{}_{}", target.name(), kind.as_str())
}

fn plain(target: Target, kind: Kind, format: BinaryFormat) -> Output {
    Output {
        identifier: identifier(target, kind),
        display_name: artifact_file_name(target, format),
        source_relative_path: artifact_path(target, format),
        target,
    }
}

fn qualified(target: Target, kind: Kind, format: BinaryFormat, arch: &str) -> Output {
    Output {
        identifier: identifier(target, kind),
        display_name: qualified_file_name(target, format, arch),
        source_relative_path: artifact_path(target, format),
        target,
    }
}

fn emulated_agent(kind: Kind, arch: &str) -> Output {
    Output {
        identifier: format!("agent_emulated_{}", kind.as_str()),
        display_name: qualified_file_name(Target::Agent, BinaryFormat::Elf, arch),
        source_relative_path: artifact_path(Target::Agent, BinaryFormat::Elf),
        target: Target::Agent,
    }
}
