//! Make-compatible dependency file generation.

use super::error::{Error, Result};
use super::settings::Output;
use super::utils::fs::{relative_path, to_posix};
use std::path::{Path, PathBuf};

/// Name of the dependency file written into the build directory.
pub const DEPFILE_FILENAME: &str = "compat.deps";

/// Builds the depfile body: one `output: inputs...` line per output.
///
/// Output paths are relative to `top_build_dir`. Source paths that no longer
/// exist are dropped, and inputs containing a space are double-quoted.
pub fn generate<'a>(
    outputs: impl IntoIterator<Item = &'a Output>,
    source_paths: impl IntoIterator<Item = &'a PathBuf>,
    build_dir: &Path,
    top_build_dir: &Path,
) -> Result<String> {
    let output_relpaths = outputs
        .into_iter()
        .map(|o| {
            let path = build_dir.join(&o.display_name);
            match relative_path(&path, top_build_dir)? {
                Some(rel) if !rel.starts_with("..") => Ok(to_posix(&rel)),
                _ => Err(Error::GenericError(format!(
                    "{} is not inside {}",
                    path.display(),
                    top_build_dir.display()
                ))),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut inputs = Vec::new();
    for path in source_paths {
        if !path.exists() {
            log::debug!("Skipping vanished source {}", path.display());
            continue;
        }
        if let Some(rel) = relative_path(path, top_build_dir)? {
            inputs.push(quote(&to_posix(&rel)));
        }
    }
    let inputs = inputs.join(" ");

    Ok(output_relpaths
        .iter()
        .map(|output| format!("{output}: {inputs}"))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Double-quotes `path` if it contains a space.
fn quote(path: &str) -> String {
    if !path.contains(' ') {
        return path.to_string();
    }
    format!("\"{}\"", path.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::settings::Target;

    fn output(name: &str) -> Output {
        Output {
            identifier: name.into(),
            display_name: name.into(),
            source_relative_path: PathBuf::from(name),
            target: Target::Agent,
        }
    }

    #[test]
    fn quotes_only_paths_with_spaces() {
        assert_eq!(quote("a/b.c"), "a/b.c");
        assert_eq!(quote("y with space"), "\"y with space\"");
        assert_eq!(quote("a \"b\""), "\"a \\\"b\\\"\"");
    }

    #[test]
    fn one_line_per_output_with_shared_inputs() {
        let top = tempfile::tempdir().unwrap();
        let build_dir = top.path().join("out");
        std::fs::create_dir_all(&build_dir).unwrap();
        let x = top.path().join("x");
        let y = top.path().join("y with space");
        std::fs::write(&x, "").unwrap();
        std::fs::write(&y, "").unwrap();

        let outputs = [output("a"), output("b")];
        let sources = [x, y];
        let text = generate(&outputs, &sources, &build_dir, top.path()).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, ["out/a: x \"y with space\"", "out/b: x \"y with space\""]);
    }

    #[test]
    fn missing_sources_are_dropped() {
        let top = tempfile::tempdir().unwrap();
        let kept = top.path().join("src/kept.c");
        std::fs::create_dir_all(kept.parent().unwrap()).unwrap();
        std::fs::write(&kept, "").unwrap();
        let gone = top.path().join("src/gone.c");

        let outputs = [output("frida-agent.so")];
        let sources = [kept, gone];
        let text = generate(&outputs, &sources, top.path(), top.path()).unwrap();
        assert_eq!(text, "frida-agent.so: src/kept.c");
    }

    #[test]
    fn sources_outside_top_build_dir_use_parent_refs() {
        let root = tempfile::tempdir().unwrap();
        let top = root.path().join("build");
        std::fs::create_dir_all(&top).unwrap();
        let src = root.path().join("lib.c");
        std::fs::write(&src, "").unwrap();

        let outputs = [output("frida-helper")];
        let sources = [src];
        let text = generate(&outputs, &sources, &top, &top).unwrap();
        assert_eq!(text, "frida-helper: ../lib.c");
    }

    #[test]
    fn build_dir_must_be_inside_top_build_dir() {
        let root = tempfile::tempdir().unwrap();
        let outputs = [output("a")];
        let sources: [PathBuf; 0] = [];
        let res = generate(&outputs, &sources, root.path(), &root.path().join("nested"));
        assert!(res.is_err());
    }
}
