//! `setup` phase: resolve the output matrix and persist it.

use crate::compat::depfile::DEPFILE_FILENAME;
use crate::compat::{
    AssetsMode, BuildState, CompatSelection, ComponentSelection, OutputMatrix, matrix, state,
};
use crate::error::Result;
use std::path::Path;

/// Resolves outputs for the primary build and saves them for `compile`.
///
/// Returns the line to print, or `None` when there is nothing to build, in
/// which case nothing is written either.
pub fn setup(
    build_dir: &Path,
    host_os: &str,
    host_arch: &str,
    compat: &CompatSelection,
    assets: AssetsMode,
    components: &ComponentSelection,
) -> Result<Option<String>> {
    let modes = compat.normalize(host_os);
    let outputs = matrix::resolve(host_os, host_arch, &modes, assets, components);

    if outputs.is_empty() {
        log::debug!("No secondary architectures needed for {host_os}-{host_arch}");
        return Ok(None);
    }

    for group in outputs.iter() {
        let ids: Vec<_> = group.outputs.iter().map(|o| o.identifier.as_str()).collect();
        log::debug!("{}: {}", group.arch, ids.join(", "));
    }

    let line = summary_line(&outputs);
    let state = BuildState {
        host_os: host_os.to_string(),
        host_arch: host_arch.to_string(),
        outputs,
    };
    state::save(build_dir, &state)?;

    Ok(Some(line))
}

/// `<ids,...> <names,...> <depfile>`
fn summary_line(outputs: &OutputMatrix) -> String {
    let (ids, names): (Vec<&str>, Vec<&str>) = outputs
        .all_outputs()
        .map(|o| (o.identifier.as_str(), o.display_name.as_str()))
        .unzip();
    format!("{} {} {}", ids.join(","), names.join(","), DEPFILE_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn android_arm64_with_gadget() {
        let dir = tempfile::tempdir().unwrap();
        let compat: CompatSelection = "native".parse().unwrap();
        let line = setup(
            dir.path(),
            "android",
            "arm64",
            &compat,
            AssetsMode::Embedded,
            &ComponentSelection::new(["gadget"]),
        )
        .unwrap();

        assert_eq!(
            line.as_deref(),
            Some(
                "helper_legacy,agent_legacy,gadget_legacy \
                 frida-helper,frida-agent.so,frida-gadget.so compat.deps"
            )
        );
        let saved = state::load(dir.path()).unwrap();
        let targets: Vec<_> = saved.outputs.get("arm").unwrap().iter().map(|o| o.target_name()).collect();
        assert_eq!(targets, ["helper", "agent", "gadget"]);
    }

    #[test]
    fn empty_matrix_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let line = setup(
            dir.path(),
            "windows",
            "x86_64",
            &CompatSelection::Disabled,
            AssetsMode::Embedded,
            &ComponentSelection::default(),
        )
        .unwrap();

        assert_eq!(line, None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
