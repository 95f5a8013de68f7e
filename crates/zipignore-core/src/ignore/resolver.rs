//! Ignore/keep decisions for paths under a traversal root

use super::rules::RuleStore;
use crate::utils::{absolutize, relative_slash_path, to_slash_path};
use crate::Result;
use std::path::{Path, PathBuf};

/// Evaluates the ordered rule set for paths beneath `root`
///
/// Each session builds its own resolver; nothing is shared globally.
#[derive(Debug, Clone)]
pub struct IgnoreResolver {
    root: PathBuf,
    rules: RuleStore,
    strict_anchoring: bool,
}

impl IgnoreResolver {
    /// Create a resolver with no rules
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self::with_rules(root, RuleStore::new())
    }

    /// Create a resolver over an existing rule store
    pub fn with_rules<P: AsRef<Path>>(root: P, rules: RuleStore) -> Self {
        Self {
            root: absolutize(root),
            rules,
            strict_anchoring: false,
        }
    }

    /// Absolute traversal root
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    /// Restrict anchored rules (leading `/`) to the root instead of any depth
    pub fn set_strict_anchoring(&mut self, strict: bool) {
        self.strict_anchoring = strict;
    }

    pub fn strict_anchoring(&self) -> bool {
        self.strict_anchoring
    }

    /// Load the conventional and discovered ignore files from the root
    pub fn load_default_files(&mut self) -> Result<usize> {
        self.rules.load_default_files(&self.root)
    }

    /// Load root files whose names match `glob_pattern`
    pub fn load_files_by_pattern(&mut self, glob_pattern: &str) -> Result<usize> {
        self.rules.load_files_by_pattern(&self.root, glob_pattern)
    }

    /// Forward-slash path of `candidate` relative to the root
    ///
    /// Relative candidates are taken as already relative to the root.
    pub fn relative_path(&self, candidate: &Path) -> String {
        if candidate.is_absolute() {
            relative_slash_path(&self.root, candidate)
        } else {
            to_slash_path(candidate)
        }
    }

    /// Decide whether `candidate` is excluded
    pub fn should_ignore(&self, candidate: &Path, is_dir: bool) -> bool {
        self.should_ignore_relative(&self.relative_path(candidate), is_dir)
    }

    /// Decide whether a root-relative, forward-slash path is excluded
    ///
    /// Every rule is evaluated in order and the last one that matches
    /// decides. Directory-only rules are skipped for files. The root
    /// itself is never excluded.
    pub fn should_ignore_relative(&self, relative: &str, is_dir: bool) -> bool {
        if relative.is_empty() {
            return false;
        }

        let mut ignored = false;
        for rule in self.rules.rules() {
            if rule.directory_only() && !is_dir {
                continue;
            }
            if rule.matches(relative, self.strict_anchoring) {
                ignored = !rule.negate();
            }
        }
        ignored
    }
}
