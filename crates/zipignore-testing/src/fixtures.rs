//! Common directory trees for ignore and archive tests

use crate::TestDir;
use anyhow::Result;

/// A small project with build output, logs and dependencies to ignore
///
/// ```text
/// .gitignore          *.log, !keep.log, build/, node_modules
/// README.md
/// app.log
/// keep.log
/// build/              directory, ignored
/// build/out.bin
/// src/main.rs
/// src/build           a file named build, kept
/// src/node_modules/dep/index.js
/// node_modules_backup/notes.txt
/// ```
pub fn create_project_tree(test_dir: &TestDir) -> Result<()> {
    test_dir.create_ignore_file(".gitignore", &["*.log", "!keep.log", "build/", "node_modules"])?;
    test_dir.create_file("README.md", b"# Project\n")?;
    test_dir.create_file("app.log", b"log line\n")?;
    test_dir.create_file("keep.log", b"important\n")?;
    test_dir.create_file("build/out.bin", &[0x7F, 0x45, 0x4C, 0x46])?;
    test_dir.create_file("src/main.rs", b"fn main() {}\n")?;
    test_dir.create_file("src/build", b"not a directory\n")?;
    test_dir.create_file("src/node_modules/dep/index.js", b"module.exports = {};\n")?;
    test_dir.create_file("node_modules_backup/notes.txt", b"backup\n")?;
    Ok(())
}

/// Relative files [`create_project_tree`] keeps, sorted
pub const PROJECT_TREE_KEPT_FILES: &[&str] = &[
    ".gitignore",
    "README.md",
    "keep.log",
    "node_modules_backup/notes.txt",
    "src/build",
    "src/main.rs",
];

/// An ignored directory holding a file a later negation tries to rescue
pub fn create_pruned_tree(test_dir: &TestDir) -> Result<()> {
    test_dir.create_ignore_file(".zipignore", &["build/", "!build/keep.txt"])?;
    test_dir.create_file("build/keep.txt", b"unreachable\n")?;
    test_dir.create_file("build/other.txt", b"ignored\n")?;
    test_dir.create_file("src/lib.rs", b"pub fn f() {}\n")?;
    Ok(())
}

/// Creates a symlink test structure (Unix only)
#[cfg(unix)]
pub fn create_symlink_structure(test_dir: &TestDir) -> Result<()> {
    use std::os::unix::fs::symlink;

    let file = test_dir.create_file("file1.txt", b"Original file")?;
    let dir = test_dir.create_dir("real_dir")?;
    test_dir.create_file("real_dir/inner.txt", b"inner")?;

    symlink(&file, test_dir.join("link_to_file1.txt"))?;
    symlink(&dir, test_dir.join("link_to_dir"))?;
    symlink(test_dir.path(), test_dir.join("real_dir/loop"))?;
    symlink(test_dir.join("missing.txt"), test_dir.join("dangling"))?;

    Ok(())
}
