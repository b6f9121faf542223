//! Forwarding of the primary build's resolved options.
//!
//! Each secondary build is configured independently, so the options the user
//! chose for the primary build have to be replayed on its command line. Options
//! that describe the primary machine, or select the primary build's own
//! helper/agent variants, are left out.

use super::builder::toolchain::resolve_program;
use super::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Built-in options that exist once per machine.
const BUILTIN_OPTIONS_PER_MACHINE: &[&str] = &["pkg_config_path", "cmake_prefix_path"];

/// Built-in options never forwarded.
const EXCLUDED_BUILTINS: &[&str] = &["buildtype", "genvslite"];

/// Language-runtime integration module with its own defaults.
const RUNTIME_MODULE: &str = "python";

/// Which machine an option applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Machine {
    /// The machine the build produces binaries for
    Host,
    /// The machine running the build
    Build,
}

/// Where an option comes from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OptionKind {
    /// Core, directory and test options
    Builtin,
    /// `b_*` options
    Base,
    /// Backend options
    Backend,
    /// Per-language compiler options
    Compiler,
    /// Declared by a project's options file
    Project,
    /// Owned by a build-system module
    Module(String),
}

/// Fully-qualified option name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptionKey {
    /// Bare option name, e.g. `c_args` or `install_env`
    pub name: String,
    /// Owning subproject, `None` for the top-level project
    pub subproject: Option<String>,
    /// Machine the option is scoped to
    pub machine: Machine,
    /// Category
    pub kind: OptionKind,
}

impl OptionKey {
    /// Decodes a key as reported by `meson introspect`.
    ///
    /// `raw` has the form `[subproject:][build.][module.]name`.
    pub fn parse(raw: &str, section: &str, machine: &str) -> Self {
        let (subproject, rest) = match raw.split_once(':') {
            Some((sub, rest)) => (Some(sub.to_string()), rest),
            None => (None, raw),
        };

        let (machine, rest) = match rest.strip_prefix("build.") {
            Some(rest) => (Machine::Build, rest),
            None if machine == "build" => (Machine::Build, rest),
            None => (Machine::Host, rest),
        };

        let (module, name) = match rest.split_once('.') {
            Some((module, name)) => (Some(module.to_string()), name),
            None => (None, rest),
        };

        let kind = match (module, section) {
            (Some(module), _) => OptionKind::Module(module),
            (None, "core" | "directory" | "test") => OptionKind::Builtin,
            (None, "base") => OptionKind::Base,
            (None, "backend") => OptionKind::Backend,
            (None, "compiler") => OptionKind::Compiler,
            (None, _) => OptionKind::Project,
        };

        Self {
            name: name.to_string(),
            subproject,
            machine,
            kind,
        }
    }

    /// Language of a compiler option (`c` for `c_args`).
    pub fn lang(&self) -> Option<&str> {
        match self.kind {
            OptionKind::Compiler => self.name.split('_').next(),
            _ => None,
        }
    }

    /// Whether the option has a separate value per machine.
    pub fn is_per_machine(&self) -> bool {
        self.is_builtin_per_machine() || self.lang().is_some()
    }

    /// Whether the host-scoped form of this key is a per-machine built-in.
    fn is_builtin_per_machine(&self) -> bool {
        self.kind == OptionKind::Builtin
            && self.subproject.is_none()
            && BUILTIN_OPTIONS_PER_MACHINE.contains(&self.name.as_str())
    }

    /// Whether the option was declared by a project.
    pub fn is_project(&self) -> bool {
        self.kind == OptionKind::Project
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sub) = &self.subproject {
            write!(f, "{sub}:")?;
        }
        if self.machine == Machine::Build {
            f.write_str("build.")?;
        }
        if let OptionKind::Module(module) = &self.kind {
            write!(f, "{module}.")?;
        }
        f.write_str(&self.name)
    }
}

/// A resolved option and its value.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildOption {
    /// Option key
    pub key: OptionKey,
    /// Current value as reported by the option store
    pub value: serde_json::Value,
}

impl BuildOption {
    /// Value in the syntax accepted on a `-D` command-line flag.
    pub fn value_string(&self) -> String {
        render_value(&self.value)
    }
}

fn render_value(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items
                .iter()
                .map(|item| format!("'{}'", render_value(item).replace('\'', "\\'")))
                .collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Source of the primary build's resolved options.
#[allow(async_fn_in_trait)]
pub trait OptionStore {
    /// Loads every option of the build configured in `build_dir`, in store order.
    async fn load(&self, build_dir: &Path) -> Result<Vec<BuildOption>>;
}

/// Reads options through `meson introspect --buildoptions`.
#[derive(Clone, Debug)]
pub struct MesonIntrospection {
    meson: PathBuf,
}

#[derive(Deserialize)]
struct IntrospectedOption {
    name: String,
    value: serde_json::Value,
    #[serde(default)]
    section: String,
    #[serde(default)]
    machine: String,
}

impl MesonIntrospection {
    /// Uses the given meson program.
    pub fn new(meson: impl Into<PathBuf>) -> Self {
        Self {
            meson: meson.into(),
        }
    }

    /// Parses `meson introspect --buildoptions` JSON output.
    pub fn parse(json: &[u8]) -> Result<Vec<BuildOption>> {
        let raw: Vec<IntrospectedOption> = serde_json::from_slice(json)?;
        Ok(raw
            .into_iter()
            .map(|o| BuildOption {
                key: OptionKey::parse(&o.name, &o.section, &o.machine),
                value: o.value,
            })
            .collect())
    }
}

impl OptionStore for MesonIntrospection {
    async fn load(&self, build_dir: &Path) -> Result<Vec<BuildOption>> {
        let meson = resolve_program(&self.meson)?;
        log::debug!(
            "Reading build options: {} introspect --buildoptions {}",
            meson.display(),
            build_dir.display()
        );

        let output = Command::new(&meson)
            .arg("introspect")
            .arg("--buildoptions")
            .arg(build_dir)
            .output()
            .await
            .map_err(|e| Error::OptionStore {
                reason: format!("failed to run {}: {e}", meson.display()),
            })?;

        if !output.status.success() {
            return Err(Error::OptionStore {
                reason: format!(
                    "{} introspect failed for {}: {}",
                    meson.display(),
                    build_dir.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Self::parse(&output.stdout)
    }
}

/// Whether `option` should be replayed on a secondary build's command line.
pub fn option_should_be_forwarded(option: &BuildOption) -> bool {
    let key = &option.key;

    if key.is_per_machine()
        && !(key.subproject.is_some() && key.is_project() && key.machine == Machine::Host)
    {
        return false;
    }

    if key.is_builtin_per_machine() {
        return false;
    }

    if key.kind == OptionKind::Builtin {
        if EXCLUDED_BUILTINS.contains(&key.name.as_str()) {
            return false;
        }
        if option.value_string().is_empty() {
            return false;
        }
    }

    if key.kind == OptionKind::Module(RUNTIME_MODULE.to_string()) {
        if key.name == "install_env" && option.value.as_str() == Some("prefix") {
            return false;
        }
        if option.value_string().is_empty() {
            return false;
        }
    }

    if key.subproject.is_none() && key.is_project() {
        let first = key.name.split('_').next().unwrap_or_default();
        let last = key.name.rsplit('_').next().unwrap_or_default();
        if matches!(first, "helper" | "agent") && matches!(last, "modern" | "legacy") {
            return false;
        }
    }

    true
}

/// Renders the forwardable options of the build in `build_dir` as `-Dname=value` flags.
pub async fn select_forwardable_options<S: OptionStore>(
    store: &S,
    build_dir: &Path,
) -> Result<Vec<String>> {
    let options = store.load(build_dir).await?;
    let flags: Vec<String> = options
        .iter()
        .filter(|o| option_should_be_forwarded(o))
        .map(|o| format!("-D{}={}", o.key, o.value_string()))
        .collect();

    log::debug!("Forwarding {} of {} build options", flags.len(), options.len());
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedStore(Vec<BuildOption>);

    impl OptionStore for FixedStore {
        async fn load(&self, _build_dir: &Path) -> Result<Vec<BuildOption>> {
            Ok(self.0.clone())
        }
    }

    fn opt(name: &str, section: &str, machine: &str, value: serde_json::Value) -> BuildOption {
        BuildOption {
            key: OptionKey::parse(name, section, machine),
            value,
        }
    }

    fn forwarded(option: BuildOption) -> bool {
        option_should_be_forwarded(&option)
    }

    #[test]
    fn parses_qualified_keys() {
        let key = OptionKey::parse("glib:build.c_args", "compiler", "build");
        assert_eq!(key.subproject.as_deref(), Some("glib"));
        assert_eq!(key.machine, Machine::Build);
        assert_eq!(key.lang(), Some("c"));
        assert_eq!(key.to_string(), "glib:build.c_args");

        let key = OptionKey::parse("python.install_env", "user", "any");
        assert_eq!(key.kind, OptionKind::Module("python".into()));
        assert_eq!(key.name, "install_env");
        assert_eq!(key.to_string(), "python.install_env");
    }

    #[test]
    fn excludes_per_machine_options() {
        assert!(!forwarded(opt("c_args", "compiler", "host", json!(["-O2"]))));
        assert!(!forwarded(opt("pkg_config_path", "core", "host", json!(["/opt/lib/pkgconfig"]))));
        assert!(!forwarded(opt("build.pkg_config_path", "core", "build", json!([]))));
    }

    #[test]
    fn excludes_named_builtins_and_empty_builtins() {
        assert!(!forwarded(opt("buildtype", "core", "any", json!("release"))));
        assert!(!forwarded(opt("genvslite", "core", "any", json!("vs2022"))));
        assert!(!forwarded(opt("libdir", "directory", "any", json!(""))));
        assert!(forwarded(opt("prefix", "directory", "any", json!("/usr"))));
    }

    #[test]
    fn runtime_module_defaults_are_dropped() {
        assert!(!forwarded(opt("python.install_env", "user", "any", json!("prefix"))));
        assert!(forwarded(opt("python.install_env", "user", "any", json!("venv"))));
        assert!(!forwarded(opt("python.platlibdir", "user", "any", json!(""))));
    }

    #[test]
    fn excludes_own_variant_selection() {
        assert!(!forwarded(opt("agent_legacy", "user", "any", json!("/tmp/agent.so"))));
        assert!(!forwarded(opt("helper_modern", "user", "any", json!(""))));
        assert!(!forwarded(opt("agent_emulated_modern", "user", "any", json!("x"))));
        // same names in subprojects are not ours
        assert!(forwarded(opt("sub:agent_legacy", "user", "any", json!("x"))));
        assert!(forwarded(opt("helper_path", "user", "any", json!("x"))));
    }

    #[test]
    fn includes_plain_project_options() {
        assert!(forwarded(opt("assets", "user", "any", json!("installed"))));
        assert!(forwarded(opt("b_ndebug", "base", "any", json!("if-release"))));
    }

    #[test]
    fn values_render_like_meson_literals() {
        assert_eq!(opt("x", "user", "any", json!(true)).value_string(), "true");
        assert_eq!(opt("x", "user", "any", json!(3)).value_string(), "3");
        assert_eq!(opt("x", "user", "any", json!(["a", "b"])).value_string(), "['a', 'b']");
        assert_eq!(
            opt("x", "user", "any", json!(["it's", "b"])).value_string(),
            r"['it\'s', 'b']"
        );
    }

    #[test]
    fn parse_introspection_output() {
        let json = br#"[
            {"name": "buildtype", "value": "debug", "section": "core", "machine": "any", "type": "combo"},
            {"name": "gadget", "value": "enabled", "section": "user", "machine": "any", "type": "feature"}
        ]"#;
        let options = MesonIntrospection::parse(json).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].key.kind, OptionKind::Builtin);
        assert_eq!(options[1].key.kind, OptionKind::Project);
    }

    #[tokio::test]
    async fn selects_flags_in_store_order() {
        let store = FixedStore(vec![
            opt("c_args", "compiler", "host", json!(["-g"])),
            opt("prefix", "directory", "any", json!("/usr")),
            opt("buildtype", "core", "any", json!("release")),
            opt("libdir", "directory", "any", json!("")),
            opt("agent_legacy", "user", "any", json!("")),
            opt("gadget", "user", "any", json!("enabled")),
        ]);

        let flags = select_forwardable_options(&store, Path::new("/build")).await.unwrap();
        assert_eq!(flags, ["-Dprefix=/usr", "-Dgadget=enabled"]);
    }
}
