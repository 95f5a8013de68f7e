//! Lazy, ignore-aware directory traversal
//!
//! Entries come out depth-first in pre-order: a directory is yielded
//! before its contents, and its contents before its later siblings.
//! An ignored directory is pruned, so nothing beneath it is read or
//! offered to the resolver. Symbolic links are yielded as leaf entries
//! and never followed, which keeps traversal finite on link cycles.

use crate::ignore::IgnoreResolver;
use crate::utils::absolutize;
use crate::Result;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// A kept filesystem entry
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// Path relative to the resolver root, always `/`-separated
    pub relative_path: String,
    /// Whether the entry is a directory (symlinks never are)
    pub is_dir: bool,
    /// Metadata of the entry itself, not of a symlink target
    pub metadata: Metadata,
}

impl FileEntry {
    pub fn is_symlink(&self) -> bool {
        self.metadata.file_type().is_symlink()
    }
}

type Predicate<'a> = Box<dyn FnMut(&DirEntry) -> bool + 'a>;

/// Walks directories, consulting an [`IgnoreResolver`] for every entry
#[derive(Debug, Clone, Copy)]
pub struct DirectoryWalker<'a> {
    resolver: &'a IgnoreResolver,
    sort_by_name: bool,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(resolver: &'a IgnoreResolver) -> Self {
        Self {
            resolver,
            sort_by_name: false,
        }
    }

    /// Visit siblings in file-name order instead of directory-listing order
    pub fn sort_by_name(mut self, sort: bool) -> Self {
        self.sort_by_name = sort;
        self
    }

    /// Start a new traversal of `dir`
    ///
    /// `dir` itself is not yielded. Every call returns an independent walk.
    pub fn walk<P: AsRef<Path>>(&self, dir: P) -> Walk<'a> {
        let mut walkdir = WalkDir::new(absolutize(dir))
            .min_depth(1)
            .follow_links(false);
        if self.sort_by_name {
            walkdir = walkdir.sort_by_file_name();
        }

        let resolver = self.resolver;
        let predicate: Predicate<'a> = Box::new(move |entry: &DirEntry| {
            let is_dir = entry.file_type().is_dir();
            if resolver.should_ignore(entry.path(), is_dir) {
                debug!(path = ?entry.path(), "Ignoring");
                false
            } else {
                true
            }
        });

        Walk {
            inner: walkdir.into_iter().filter_entry(predicate),
            resolver,
            finished: false,
        }
    }

    /// Collect every kept entry, directories included
    pub fn file_list<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<FileEntry>> {
        self.walk(dir).collect()
    }

    /// Collect every kept entry that is not a directory
    pub fn files_only<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<FileEntry>> {
        self.walk(dir)
            .filter(|entry| entry.as_ref().map_or(true, |entry| !entry.is_dir))
            .collect()
    }
}

/// An in-progress traversal; pull entries with [`Iterator::next`]
///
/// Dropping the walk stops it; no work continues in the background.
pub struct Walk<'a> {
    inner: FilterEntry<walkdir::IntoIter, Predicate<'a>>,
    resolver: &'a IgnoreResolver,
    finished: bool,
}

impl Walk<'_> {
    /// Skip the contents of the most recently yielded directory
    pub fn skip_current_dir(&mut self) {
        self.inner.skip_current_dir();
    }

    fn fail(&mut self, err: walkdir::Error) -> Option<Result<FileEntry>> {
        self.finished = true;
        Some(Err(err.into()))
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            // Ignored entries never reach here; filter_entry prunes them
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(err) if is_permission_denied(&err) => {
                    debug!(path = ?err.path(), "Permission denied, skipping");
                    continue;
                }
                Err(err) => return self.fail(err),
            };

            // Not followed: a symlink reports its own metadata
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) if is_permission_denied(&err) => {
                    debug!(path = ?entry.path(), "Cannot read metadata, skipping");
                    // Its children would fail the same way
                    if entry.file_type().is_dir() {
                        self.inner.skip_current_dir();
                    }
                    continue;
                }
                Err(err) => return self.fail(err),
            };

            return Some(Ok(FileEntry {
                relative_path: self.resolver.relative_path(entry.path()),
                is_dir: entry.file_type().is_dir(),
                absolute_path: entry.into_path(),
                metadata,
            }));
        }
    }
}

fn is_permission_denied(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn relative_paths(entries: &[FileEntry]) -> Vec<String> {
        let mut paths: Vec<String> = entries.iter().map(|e| e.relative_path.clone()).collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_walk_yields_all_without_rules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/nested/lib.rs"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let resolver = IgnoreResolver::new(root);
        let entries = DirectoryWalker::new(&resolver).file_list(root).unwrap();
        assert_eq!(
            relative_paths(&entries),
            vec!["README.md", "src", "src/nested", "src/nested/lib.rs"]
        );
    }

    #[test]
    fn test_preorder_parent_before_children() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/c.txt"), "").unwrap();
        fs::write(root.join("z.txt"), "").unwrap();

        let resolver = IgnoreResolver::new(root);
        let order: Vec<String> = DirectoryWalker::new(&resolver)
            .sort_by_name(true)
            .walk(root)
            .map(|e| e.unwrap().relative_path)
            .collect();
        assert_eq!(order, vec!["a", "a/b", "a/b/c.txt", "z.txt"]);
    }

    #[test]
    fn test_files_only_excludes_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("dir")).unwrap();
        fs::write(root.join("dir/file.txt"), "x").unwrap();

        let resolver = IgnoreResolver::new(root);
        let files = DirectoryWalker::new(&resolver).files_only(root).unwrap();
        assert_eq!(relative_paths(&files), vec!["dir/file.txt"]);
        assert!(files.iter().all(|f| !f.is_dir));
        assert_eq!(files[0].metadata.len(), 1);
    }

    #[test]
    fn test_walk_is_restartable() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("one.txt"), "").unwrap();

        let resolver = IgnoreResolver::new(temp_dir.path());
        let walker = DirectoryWalker::new(&resolver);
        assert_eq!(walker.walk(temp_dir.path()).count(), 1);
        assert_eq!(walker.walk(temp_dir.path()).count(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let resolver = IgnoreResolver::new(&missing);
        let mut walk = DirectoryWalker::new(&resolver).walk(&missing);
        assert!(matches!(walk.next(), Some(Err(crate::Error::Walk { .. }))));
        assert!(walk.next().is_none());
    }
}
