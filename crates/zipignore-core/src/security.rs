//! Path guard for archive extraction

use crate::{Error, Result};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::error;

/// Resolve an untrusted archive entry name beneath `base`
///
/// `base` must exist. The result is built on the canonical form of `base`
/// and may only descend from it: parent components, absolute paths and
/// drive prefixes are rejected, as are names that resolve to `base` itself.
/// Any part of the result that already exists as a symlink is rejected too,
/// since writing through it could land outside `base`.
pub fn sanitize_path(base: &Path, untrusted: &Path) -> Result<PathBuf> {
    let canonical_base = base
        .canonicalize()
        .map_err(|e| Error::InvalidPath(format!("Cannot canonicalize base path: {}", e)))?;

    let mut result = canonical_base.clone();
    for component in untrusted.components() {
        match component {
            Component::Normal(name) => result.push(name),
            Component::CurDir => {}
            Component::ParentDir => {
                error!(path = ?untrusted, "Path contains parent directory component");
                return Err(Error::SecurityError(format!(
                    "Path traversal attempt detected: {:?}",
                    untrusted
                )));
            }
            Component::RootDir => {
                error!(path = ?untrusted, "Path is absolute");
                return Err(Error::SecurityError(format!(
                    "Absolute path not allowed: {:?}",
                    untrusted
                )));
            }
            Component::Prefix(_) => {
                error!(path = ?untrusted, "Path contains Windows prefix");
                return Err(Error::SecurityError(format!(
                    "Windows path prefix not allowed: {:?}",
                    untrusted
                )));
            }
        }
    }

    if result == canonical_base || !result.starts_with(&canonical_base) {
        error!(base = ?base, path = ?untrusted, result = ?result, "Path does not descend from base directory");
        return Err(Error::SecurityError(format!(
            "Path would escape extraction directory: {:?}",
            untrusted
        )));
    }

    reject_symlinked_components(&canonical_base, &result, untrusted)?;
    Ok(result)
}

/// Fail if any existing component of `path` below `canonical_base` is a symlink
fn reject_symlinked_components(
    canonical_base: &Path,
    path: &Path,
    untrusted: &Path,
) -> Result<()> {
    let relative = path.strip_prefix(canonical_base).map_err(|_| {
        Error::SecurityError(format!(
            "Path would escape extraction directory: {:?}",
            untrusted
        ))
    })?;

    let mut current = canonical_base.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match current.symlink_metadata() {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                error!(path = ?untrusted, link = ?current, "Path passes through a symlink");
                return Err(Error::SecurityError(format!(
                    "Path passes through symlink {:?}: {:?}",
                    current, untrusted
                )));
            }
            Ok(_) => {}
            // Nothing below a missing component exists yet
            Err(e) if e.kind() == io::ErrorKind::NotFound => break,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(())
}

/// Check that `path`, resolved on disk, still lies under `canonical_base`
///
/// `path` must exist. Used after directories are created for an entry.
pub fn ensure_within(canonical_base: &Path, path: &Path) -> Result<()> {
    let resolved = path.canonicalize()?;
    if !resolved.starts_with(canonical_base) {
        error!(base = ?canonical_base, path = ?path, resolved = ?resolved, "Path resolves outside base directory");
        return Err(Error::SecurityError(format!(
            "Path resolves outside extraction directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Check an entry name without touching the filesystem
pub fn is_safe_entry_name(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && !name.contains('\0')
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && path.components().any(|c| matches!(c, Component::Normal(_)))
}
