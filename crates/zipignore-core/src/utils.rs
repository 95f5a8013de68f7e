//! Path helpers shared by the resolver, walker and archive code

use std::path::{Component, Path, PathBuf};

/// Make a path absolute without touching the filesystem
///
/// Relative paths are joined onto the current directory and `.`/`..`
/// components are folded lexically. Symlinks are not resolved, so the
/// result stays comparable with paths produced by walking the same tree.
pub fn absolutize<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut result = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Render a path with `/` separators, dropping roots, prefixes and `.`
pub fn to_slash_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of `path` relative to `base`, forward-slash normalised
///
/// Paths outside `base` come back as their full normalised form.
pub fn relative_slash_path(base: &Path, path: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(relative) => to_slash_path(relative),
        Err(_) => to_slash_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolutize_folds_dots() {
        let path = absolutize("/tmp/a/./b/../c");
        assert_eq!(path, PathBuf::from("/tmp/a/c"));
    }

    #[test]
    fn test_absolutize_relative() {
        let path = absolutize("some/dir");
        assert!(path.is_absolute());
        assert!(path.ends_with("some/dir"));
    }

    #[test]
    fn test_to_slash_path() {
        assert_eq!(to_slash_path(Path::new("a/b/c.txt")), "a/b/c.txt");
        assert_eq!(to_slash_path(Path::new("./a/b")), "a/b");
        assert_eq!(to_slash_path(Path::new("")), "");
    }

    #[test]
    fn test_relative_slash_path() {
        let base = Path::new("/work/project");
        assert_eq!(
            relative_slash_path(base, Path::new("/work/project/src/main.rs")),
            "src/main.rs"
        );
        assert_eq!(relative_slash_path(base, base), "");
        assert_eq!(
            relative_slash_path(base, Path::new("/elsewhere/file")),
            "elsewhere/file"
        );
    }
}
