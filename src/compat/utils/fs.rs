//! Filesystem helpers shared by the build driver and depfile synthesizer.

use crate::bail;
use crate::compat::error::{Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Copies a build product into the shared output directory.
///
/// Fails with [`Error::OutputMissing`] when the toolchain reported success but
/// did not write `from`.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !fs::try_exists(from).await.unwrap_or(false) {
        return Err(Error::OutputMissing {
            path: from.to_path_buf(),
        });
    }
    if !from.is_file() {
        bail!("{from:?} is not a file");
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating output directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying build output", from)?;
    Ok(())
}

/// Returns `path` as an absolute, lexically normalized path.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving absolute path", path)?
        .into_owned())
}

/// Computes `path` relative to `base`, walking up with `..` where needed.
///
/// Both paths are made absolute first. Returns `None` when they do not share a
/// root (e.g. different drives on Windows).
pub fn relative_path(path: &Path, base: &Path) -> Result<Option<PathBuf>> {
    let path = absolute(path)?;
    let base = absolute(base)?;

    let mut path_parts = path.components().peekable();
    let mut base_parts = base.components().peekable();

    match (path_parts.peek(), base_parts.peek()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) if a != b => return Ok(None),
        _ => {}
    }

    while let (Some(a), Some(b)) = (path_parts.peek(), base_parts.peek()) {
        if a != b {
            break;
        }
        path_parts.next();
        base_parts.next();
    }

    let mut rel = PathBuf::new();
    for _ in base_parts {
        rel.push("..");
    }
    for part in path_parts {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Ok(Some(rel))
}

/// Renders a relative path with `/` separators.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
