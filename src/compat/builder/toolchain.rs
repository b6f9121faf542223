//! Configure/build toolchain invocation.
//!
//! The toolchain is opaque: a configure script that sets up a build directory
//! named by `FRIDA_BUILDDIR`, and a build command run inside that directory.

use crate::compat::env::EnvMap;
use crate::compat::error::{Error, Result};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Configure and build steps of the underlying toolchain.
#[allow(async_fn_in_trait)]
pub trait Toolchain {
    /// Configures `workdir` for `host` (`<os>-<arch>`) with extra `-D` flags.
    async fn configure(&self, workdir: &Path, host: &str, flags: &[String], env: &EnvMap) -> Result<()>;

    /// Builds `targets` inside the already-configured `workdir`.
    async fn build(&self, workdir: &Path, targets: &[&str], env: &EnvMap) -> Result<()>;
}

/// Where the toolchain's entry points live.
#[derive(Clone, Debug)]
pub struct ToolchainConfig {
    /// Source tree containing the configure script
    pub source_root: PathBuf,
    /// Build command used on non-Windows hosts
    pub make: PathBuf,
    /// Program used to introspect the primary build's options
    pub meson: PathBuf,
}

impl ToolchainConfig {
    /// Configure script for the running platform.
    pub fn configure_script(&self) -> PathBuf {
        if cfg!(windows) {
            self.source_root.join("configure.bat")
        } else {
            self.source_root.join("configure")
        }
    }

    /// Build command for the running platform.
    pub fn make_command(&self) -> PathBuf {
        if cfg!(windows) {
            self.source_root.join("make.bat")
        } else {
            self.make.clone()
        }
    }
}

/// Locates `program` on PATH unless it already names a path.
pub fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 {
        return Ok(program.to_path_buf());
    }
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program.display(), path.display());
            Ok(path)
        }
        Err(e) => Err(Error::ToolNotFound {
            tool: program.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Runs the configure script and build command as subprocesses.
#[derive(Clone, Debug)]
pub struct ScriptToolchain {
    config: ToolchainConfig,
}

impl ScriptToolchain {
    /// Creates a toolchain driver for `config`.
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }
}

impl Toolchain for ScriptToolchain {
    async fn configure(&self, _workdir: &Path, host: &str, flags: &[String], env: &EnvMap) -> Result<()> {
        let mut args = vec![format!("--host={host}"), "--".to_string()];
        args.extend(flags.iter().cloned());
        perform(&self.config.configure_script(), &args, None, env).await?;
        Ok(())
    }

    async fn build(&self, workdir: &Path, targets: &[&str], env: &EnvMap) -> Result<()> {
        let make = resolve_program(&self.config.make_command())?;
        let args: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
        perform(&make, &args, Some(workdir), env).await?;
        Ok(())
    }
}

/// Runs `program` with exactly `env`, capturing stdout and stderr together.
///
/// Returns the captured lines on success and [`Error::ToolchainFailure`] when
/// the process exits unsuccessfully.
pub async fn perform(
    program: &Path,
    args: &[String],
    cwd: Option<&Path>,
    env: &EnvMap,
) -> Result<Vec<String>> {
    let command_line = std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    log::debug!("Running: {command_line}");

    let mut command = Command::new(program);
    command
        .args(args)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    let mut child = command.spawn().map_err(|error| Error::ToolchainSpawn {
        command: command_line.clone(),
        error,
    })?;

    // Both streams feed one buffer so the output keeps its rough interleaving.
    let captured = RefCell::new(Vec::new());
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::join!(
        drain_lines(stdout, &captured),
        drain_lines(stderr, &captured)
    );

    let status = child.wait().await.map_err(|e| Error::ToolchainFailure {
        command: command_line.clone(),
        code: None,
        output: vec![format!("failed to wait: {e}")],
    })?;
    let output = captured.into_inner();

    if !status.success() {
        return Err(Error::ToolchainFailure {
            command: command_line,
            code: status.code(),
            output,
        });
    }

    for line in &output {
        log::trace!("| {line}");
    }
    Ok(output)
}

/// Reads `stream` to EOF, pushing each line into `captured`.
///
/// Lines are decoded lossily; the stream is never abandoned early, so the
/// child cannot be killed by a closed pipe.
async fn drain_lines<R: AsyncRead + Unpin>(stream: Option<R>, captured: &RefCell<Vec<String>>) {
    let Some(stream) = stream else {
        return;
    };
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                captured
                    .borrow_mut()
                    .push(String::from_utf8_lossy(&buf).into_owned());
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("Stopped reading toolchain output: {e}");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell_env() -> EnvMap {
        let mut env = EnvMap::new();
        env.insert("PATH".into(), "/usr/bin:/bin".into());
        env.insert("MARKER".into(), "from-env".into());
        env
    }

    #[tokio::test]
    async fn captures_output_of_successful_command() {
        let out = perform(
            Path::new("/bin/sh"),
            &["-c".into(), "echo $MARKER; echo err 1>&2".into()],
            None,
            &shell_env(),
        )
        .await
        .unwrap();
        assert!(out.contains(&"from-env".to_string()));
        assert!(out.contains(&"err".to_string()));
    }

    #[tokio::test]
    async fn non_utf8_output_does_not_fail_successful_command() {
        let script = "printf 'caf\\351\\n'; i=0; while [ $i -lt 20000 ]; do echo line $i; i=$((i+1)); done; exit 0";
        let out = perform(Path::new("/bin/sh"), &["-c".into(), script.into()], None, &shell_env())
            .await
            .unwrap();
        assert_eq!(out[0], "caf\u{FFFD}");
        assert_eq!(out.len(), 20001);
        assert_eq!(out.last().map(String::as_str), Some("line 19999"));
    }

    #[tokio::test]
    async fn missing_program_is_reported_as_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = perform(&dir.path().join("configure"), &[], None, &shell_env())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolchainSpawn { .. }));
        assert!(err.to_string().starts_with("failed to start"));
    }

    #[tokio::test]
    async fn failing_command_keeps_output() {
        let err = perform(
            Path::new("/bin/sh"),
            &["-c".into(), "echo broken; exit 3".into()],
            None,
            &shell_env(),
        )
        .await
        .unwrap_err();

        match err {
            Error::ToolchainFailure { code, output, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(output, ["broken"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        perform(
            Path::new("/bin/sh"),
            &["-c".into(), "touch marker".into()],
            Some(dir.path()),
            &shell_env(),
        )
        .await
        .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn explicit_paths_skip_lookup() {
        let path = Path::new("/opt/tools/make");
        assert_eq!(resolve_program(path).unwrap(), path);
    }
}
