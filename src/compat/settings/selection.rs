//! Compatibility, component and asset selections passed to `setup`.

use std::collections::BTreeSet;
use std::str::FromStr;

/// Operating systems for which `auto` turns on both native and emulated support.
const AUTO_COMPAT_OSES: &[&str] = &["windows", "macos", "ios", "tvos", "android"];

/// Splits a comma-separated option value into a set of trimmed tokens.
pub fn parse_token_list(value: &str) -> BTreeSet<String> {
    value.split(',').map(|t| t.trim().to_string()).collect()
}

/// Kind of secondary-architecture support.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum CompatMode {
    /// The device runs the other instruction set natively
    Native,
    /// The device runs it through an emulation layer
    Emulated,
}

/// Compatibility selection as given on the command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompatSelection {
    /// Platform-dependent default
    Auto,
    /// No secondary architectures
    Disabled,
    /// Explicit list of modes; unknown tokens are kept but never match a rule
    Modes(BTreeSet<String>),
}

impl FromStr for CompatSelection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let tokens = parse_token_list(value);

        if tokens.len() > 1 {
            for reserved in ["auto", "disabled"] {
                if tokens.contains(reserved) {
                    return Err(format!(
                        "the compat '{reserved}' choice cannot be combined with other choices"
                    ));
                }
            }
        }

        if tokens.contains("auto") {
            Ok(Self::Auto)
        } else if tokens.contains("disabled") {
            Ok(Self::Disabled)
        } else {
            Ok(Self::Modes(tokens))
        }
    }
}

impl CompatSelection {
    /// Expands `auto`/`disabled` into the concrete set of modes for `host_os`.
    pub fn normalize(&self, host_os: &str) -> BTreeSet<CompatMode> {
        match self {
            Self::Auto if AUTO_COMPAT_OSES.contains(&host_os) => {
                [CompatMode::Native, CompatMode::Emulated].into_iter().collect()
            }
            Self::Auto | Self::Disabled => BTreeSet::new(),
            Self::Modes(tokens) => tokens
                .iter()
                .filter_map(|t| match t.as_str() {
                    "native" => Some(CompatMode::Native),
                    "emulated" => Some(CompatMode::Emulated),
                    _ => None,
                })
                .collect(),
        }
    }
}

/// Which optional components the primary build produces.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ComponentSelection(BTreeSet<String>);

impl ComponentSelection {
    /// Builds a selection from component tokens.
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// Whether `component` was requested.
    pub fn contains(&self, component: &str) -> bool {
        self.0.contains(component)
    }
}

impl FromStr for ComponentSelection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self(parse_token_list(value)))
    }
}

/// How the primary build ships its assets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssetsMode {
    /// Helper/agent are embedded into the main binary
    Embedded,
    /// Assets are installed next to it and loaded at runtime
    Installed,
}

impl FromStr for AssetsMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "embedded" => Ok(Self::Embedded),
            "installed" => Ok(Self::Installed),
            other => Err(format!(
                "invalid assets mode '{other}' (expected 'embedded' or 'installed')"
            )),
        }
    }
}
