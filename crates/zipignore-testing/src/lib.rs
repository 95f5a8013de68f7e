//! Testing utilities and fixtures for zipignore
//!
//! Scratch directory trees, ignore-file fixtures and assertions over walked
//! trees and ZIP archives. Nothing here depends on `zipignore-core`, so the
//! core crate can use it from its own tests.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod assertions;
pub mod fixtures;

/// Creates a temporary test directory with cleanup on drop
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates a new temporary test directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the test directory
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Creates a file with the given name and content, creating parents
    pub fn create_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Creates a directory with the given name in the test directory
    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Writes an ignore file made of `lines`
    pub fn create_ignore_file(&self, name: &str, lines: &[&str]) -> Result<PathBuf> {
        let mut content = lines.join("\n");
        content.push('\n');
        self.create_file(name, content.as_bytes())
    }
}
