//! Where the toolchain writes each target, per binary format.
//!
//! Every path is relative to an architecture's private work directory. The
//! resolver only ever looks files up here, so adding a platform means adding
//! rows, not branches.

use super::Target;
use std::path::{Path, PathBuf};

/// Binary format family of the host OS.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryFormat {
    /// PE (.exe / .dll)
    Windows,
    /// Mach-O (.dylib)
    Darwin,
    /// ELF (.so)
    Elf,
}

impl BinaryFormat {
    /// Format used for binaries built for `host_os`.
    pub fn for_os(host_os: &str) -> Self {
        match host_os {
            "windows" => Self::Windows,
            "macos" | "ios" | "tvos" | "watchos" => Self::Darwin,
            _ => Self::Elf,
        }
    }
}

/// Relative path of a target's build product.
struct LayoutEntry {
    target: Target,
    format: Option<BinaryFormat>,
    path: &'static str,
}

/// `format: None` rows apply to every format without a more specific row.
const LAYOUT: &[LayoutEntry] = &[
    LayoutEntry { target: Target::Helper, format: Some(BinaryFormat::Windows), path: "src/frida-helper.exe" },
    LayoutEntry { target: Target::Helper, format: None, path: "src/frida-helper" },
    LayoutEntry { target: Target::Agent, format: Some(BinaryFormat::Windows), path: "lib/agent/frida-agent.dll" },
    LayoutEntry { target: Target::Agent, format: Some(BinaryFormat::Darwin), path: "lib/agent/frida-agent.dylib" },
    LayoutEntry { target: Target::Agent, format: Some(BinaryFormat::Elf), path: "lib/agent/frida-agent.so" },
    LayoutEntry { target: Target::Gadget, format: Some(BinaryFormat::Windows), path: "lib/gadget/frida-gadget.dll" },
    LayoutEntry { target: Target::Gadget, format: Some(BinaryFormat::Darwin), path: "lib/gadget/frida-gadget.dylib" },
    LayoutEntry { target: Target::Gadget, format: Some(BinaryFormat::Elf), path: "lib/gadget/frida-gadget.so" },
    LayoutEntry { target: Target::Server, format: None, path: "server/frida-server" },
];

/// Path, relative to the work directory, where `target` is produced.
pub fn artifact_path(target: Target, format: BinaryFormat) -> PathBuf {
    LAYOUT
        .iter()
        .filter(|e| e.target == target)
        .find(|e| e.format == Some(format))
        .or_else(|| LAYOUT.iter().find(|e| e.target == target && e.format.is_none()))
        .map(|e| PathBuf::from(e.path))
        .unwrap_or_else(|| PathBuf::from(target.build_target()))
}

/// File name part of [`artifact_path`].
pub fn artifact_file_name(target: Target, format: BinaryFormat) -> String {
    let path = artifact_path(target, format);
    file_name_of(&path)
}

/// Architecture-qualified file name, e.g. `frida-agent-arm64.dylib`.
pub fn qualified_file_name(target: Target, format: BinaryFormat, arch: &str) -> String {
    let path = artifact_path(target, format);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{stem}-{arch}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{arch}"),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
