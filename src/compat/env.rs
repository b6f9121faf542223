//! Environment sanitization for nested toolchain invocations.
//!
//! A secondary-architecture build must not inherit the primary build's
//! compiler pins or a Windows developer prompt's architecture-specific paths.

use std::collections::BTreeMap;

/// Environment passed explicitly instead of read from the process.
pub type EnvMap = BTreeMap<String, String>;

/// Variables that pin a particular compiler, linker or tool flags.
pub const TOOLCHAIN_ENVVARS: &[&str] = &[
    "AR",
    "AS",
    "CC",
    "CPP",
    "CXX",
    "LD",
    "NM",
    "OBJC",
    "OBJCXX",
    "OBJCOPY",
    "OBJDUMP",
    "RANLIB",
    "READELF",
    "STRIP",
    "LIBTOOL",
    "PKG_CONFIG",
    "PKG_CONFIG_PATH",
    "VALAC",
    "CFLAGS",
    "CPPFLAGS",
    "CXXFLAGS",
    "OBJCFLAGS",
    "OBJCXXFLAGS",
    "LDFLAGS",
    "VALAFLAGS",
];

/// Variables injected by a Visual Studio developer environment.
pub const MSVS_ENVVARS: &[&str] = &["PLATFORM", "VCINSTALLDIR", "INCLUDE", "LIB"];

/// Records where Visual Studio's tools are installed.
const MSVS_INSTALL_ROOT_VAR: &str = "VCINSTALLDIR";

/// PATH segment identifying Windows SDK directories.
const WINDOWS_SDK_MARKER: &str = "WINDOWS KITS";

/// Platform whose conventions apply to the environment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HostPlatform {
    /// `;`-separated PATH, case-insensitive paths
    Windows,
    /// Anything else; PATH is left alone
    Unix,
}

impl HostPlatform {
    /// Platform this binary is running on.
    pub fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }
}

/// Returns a copy of the current process environment.
///
/// Variables whose name or value is not valid Unicode are skipped.
pub fn process_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Drops toolchain pins and, on Windows, developer-prompt PATH entries.
pub fn scrub(env: &EnvMap, platform: HostPlatform) -> EnvMap {
    env.iter()
        .filter(|(k, _)| {
            !TOOLCHAIN_ENVVARS.contains(&k.as_str()) && !MSVS_ENVVARS.contains(&k.as_str())
        })
        .map(|(k, v)| {
            let value = if platform == HostPlatform::Windows && k.eq_ignore_ascii_case("PATH") {
                scrub_windows_devenv_dirs_from_path(v, env)
            } else {
                v.clone()
            };
            (k.clone(), value)
        })
        .collect()
}

/// Removes Visual Studio and Windows SDK directories from a Windows PATH value.
pub fn scrub_windows_devenv_dirs_from_path(raw_path: &str, env: &EnvMap) -> String {
    let Some(install_root) = env.get(MSVS_INSTALL_ROOT_VAR) else {
        return raw_path.to_string();
    };
    // An empty root would prefix every entry; only the SDK check applies then.
    let install_root = windows_components(install_root);

    raw_path
        .split(';')
        .filter(|entry| {
            let parts = windows_components(entry);
            if !install_root.is_empty() && parts.starts_with(&install_root) {
                log::debug!("Dropping PATH entry under {MSVS_INSTALL_ROOT_VAR}: {entry}");
                return false;
            }
            if parts.iter().any(|p| p == WINDOWS_SDK_MARKER) {
                log::debug!("Dropping Windows SDK PATH entry: {entry}");
                return false;
            }
            true
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Upper-cased path components, accepting both separators.
fn windows_components(path: &str) -> Vec<String> {
    path.split(['\\', '/'])
        .filter(|p| !p.is_empty() && *p != ".")
        .map(str::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn removes_every_toolchain_pin() {
        let mut input: EnvMap = TOOLCHAIN_ENVVARS
            .iter()
            .map(|k| (k.to_string(), "x".to_string()))
            .collect();
        input.insert("HOME".into(), "/home/me".into());

        let out = scrub(&input, HostPlatform::Unix);
        assert_eq!(out, env(&[("HOME", "/home/me")]));
    }

    #[test]
    fn removes_msvs_variables() {
        let input = env(&[
            ("PLATFORM", "x64"),
            ("VCINSTALLDIR", "C:\\VS\\VC\\"),
            ("INCLUDE", "C:\\inc"),
            ("LIB", "C:\\lib"),
            ("USERNAME", "me"),
        ]);
        assert_eq!(scrub(&input, HostPlatform::Unix), env(&[("USERNAME", "me")]));
    }

    #[test]
    fn unix_path_is_untouched() {
        let input = env(&[
            ("PATH", "/opt/Windows Kits/bin:/usr/bin"),
            ("VCINSTALLDIR", "/opt"),
        ]);
        let out = scrub(&input, HostPlatform::Unix);
        assert_eq!(out["PATH"], "/opt/Windows Kits/bin:/usr/bin");
    }

    #[test]
    fn windows_path_drops_devenv_entries_and_keeps_order() {
        let input = env(&[
            (
                "Path",
                "C:\\Tools\\bin;C:\\VS\\VC\\Tools\\MSVC\\bin;C:\\Program Files (x86)\\windows kits\\10\\bin;C:\\Python;C:\\VS\\VCExtra",
            ),
            ("VCINSTALLDIR", "C:\\VS\\VC\\"),
        ]);

        let out = scrub(&input, HostPlatform::Windows);
        assert_eq!(out["Path"], "C:\\Tools\\bin;C:\\Python;C:\\VS\\VCExtra");
        assert!(!out.contains_key("VCINSTALLDIR"));
    }

    #[test]
    fn install_root_match_is_case_insensitive() {
        let input = env(&[("VCINSTALLDIR", "c:\\vs\\vc")]);
        let out = scrub_windows_devenv_dirs_from_path("C:\\VS\\VC;D:\\bin", &input);
        assert_eq!(out, "D:\\bin");
    }

    #[test]
    fn empty_install_root_still_drops_sdk_entries() {
        let input = env(&[("VCINSTALLDIR", "")]);
        let out = scrub_windows_devenv_dirs_from_path(
            "C:\\Windows Kits\\10\\bin;C:\\bin;D:\\tools",
            &input,
        );
        assert_eq!(out, "C:\\bin;D:\\tools");
    }

    #[test]
    fn windows_path_without_install_root_is_kept() {
        let input = env(&[("PATH", "C:\\Windows Kits\\bin;C:\\bin")]);
        let out = scrub(&input, HostPlatform::Windows);
        assert_eq!(out["PATH"], "C:\\Windows Kits\\bin;C:\\bin");
    }
}
