//! Compilation database reading.

use crate::compat::error::{ErrorExt, Result};
use crate::compat::utils::fs::absolute;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the compilation database inside a work directory.
pub const COMPILE_COMMANDS_FILENAME: &str = "compile_commands.json";

#[derive(Deserialize)]
struct CompileCommand {
    file: PathBuf,
}

/// Absolute paths of every source compiled in `workdir`.
pub fn source_files(workdir: &Path) -> Result<Vec<PathBuf>> {
    let path = workdir.join(COMPILE_COMMANDS_FILENAME);
    let contents = std::fs::read(&path).fs_context("reading compilation database", &path)?;
    let commands: Vec<CompileCommand> = serde_json::from_slice(&contents)?;

    commands
        .into_iter()
        .map(|cmd| absolute(&workdir.join(cmd.file)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_files_against_workdir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(COMPILE_COMMANDS_FILENAME),
            r#"[
                {"directory": ".", "command": "cc -c ../../lib/a.c", "file": "../../lib/a.c"},
                {"directory": ".", "command": "cc -c /abs/b.c", "file": "/abs/b.c"}
            ]"#,
        )
        .unwrap();

        let files = source_files(dir.path()).unwrap();
        let expected_a = absolute(&dir.path().join("../../lib/a.c")).unwrap();
        assert_eq!(files, [expected_a, PathBuf::from("/abs/b.c")]);
    }

    #[test]
    fn missing_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(source_files(dir.path()).is_err());
    }
}
