//! Where a session's ignore rules come from, and the order they load in

use super::resolver::IgnoreResolver;
use super::rules::{discover_ignore_files, LoadOutcome, CONVENTIONAL_IGNORE_FILES};
use crate::config::IgnoreConfig;
use crate::utils::absolutize;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Rule sources for one session
///
/// Loading order, and therefore precedence from lowest to highest:
/// 1. `default_files` from the root
/// 2. other `.*ignore` files in the root when `auto_ignore` is set
/// 3. root files matching `ignore_pattern`
/// 4. explicit `ignore_files`
/// 5. ad-hoc `patterns`
#[derive(Debug, Clone)]
pub struct IgnoreSources {
    pub default_files: Vec<String>,
    pub auto_ignore: bool,
    pub ignore_pattern: Option<String>,
    pub ignore_files: Vec<PathBuf>,
    pub patterns: Vec<String>,
    pub strict_anchoring: bool,
}

impl Default for IgnoreSources {
    fn default() -> Self {
        Self {
            default_files: CONVENTIONAL_IGNORE_FILES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            auto_ignore: true,
            ignore_pattern: None,
            ignore_files: Vec::new(),
            patterns: Vec::new(),
            strict_anchoring: false,
        }
    }
}

impl IgnoreSources {
    /// Sources seeded from the `[ignore]` configuration section
    pub fn from_config(config: &IgnoreConfig) -> Self {
        Self {
            default_files: config.default_files.clone(),
            auto_ignore: config.auto_ignore,
            patterns: config.extra_patterns.clone(),
            strict_anchoring: config.strict_anchoring,
            ..Self::default()
        }
    }

    /// Load every source into `resolver`, relative to its root
    pub fn apply(&self, resolver: &mut IgnoreResolver) -> Result<()> {
        resolver.set_strict_anchoring(self.strict_anchoring);
        let root = resolver.root().to_path_buf();
        let rules = resolver.rules_mut();

        rules.load_named_files(&root, &self.default_files)?;

        if self.auto_ignore {
            for path in discover_ignore_files(&root, &self.default_files) {
                rules.load_file(&path)?;
            }
        }

        if let Some(pattern) = &self.ignore_pattern {
            let loaded = rules.load_files_by_pattern(&root, pattern)?;
            debug!(pattern = %pattern, files = loaded, "Loaded ignore files by pattern");
        }

        for file in &self.ignore_files {
            let path = absolutize(file);
            if rules.load_file(&path)? == LoadOutcome::Missing {
                warn!(path = ?path, "Ignore file does not exist, skipping");
            }
        }

        for pattern in &self.patterns {
            rules.add_pattern(pattern);
        }

        debug!(
            rules = rules.len(),
            files = ?rules.loaded_files(),
            "Ignore rules ready"
        );
        Ok(())
    }

    /// Build a resolver for `root` with every source loaded
    pub fn build_resolver<P: AsRef<Path>>(&self, root: P) -> Result<IgnoreResolver> {
        let mut resolver = IgnoreResolver::new(root);
        self.apply(&mut resolver)?;
        Ok(resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_sources() {
        let sources = IgnoreSources::default();
        assert!(sources.auto_ignore);
        assert_eq!(sources.default_files.len(), 3);
        assert!(sources.patterns.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = IgnoreConfig {
            default_files: vec![".zipignore".to_string()],
            auto_ignore: false,
            strict_anchoring: true,
            extra_patterns: vec!["*.bak".to_string()],
        };
        let sources = IgnoreSources::from_config(&config);
        assert_eq!(sources.default_files, vec![".zipignore"]);
        assert!(!sources.auto_ignore);
        assert!(sources.strict_anchoring);
        assert_eq!(sources.patterns, vec!["*.bak"]);
    }

    #[test]
    fn test_apply_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "from-gitignore\n").unwrap();
        fs::write(root.join(".dockerignore"), "from-discovery\n").unwrap();
        fs::write(root.join("extra.rules"), "from-pattern\n").unwrap();
        let explicit = temp_dir.path().join("explicit.txt");
        fs::write(&explicit, "from-explicit\n").unwrap();

        let sources = IgnoreSources {
            ignore_pattern: Some("*.rules".to_string()),
            ignore_files: vec![explicit],
            patterns: vec!["from-cli".to_string()],
            ..IgnoreSources::default()
        };
        let resolver = sources.build_resolver(root).unwrap();

        let patterns: Vec<&str> = resolver
            .rules()
            .rules()
            .iter()
            .map(|rule| rule.pattern())
            .collect();
        assert_eq!(
            patterns,
            vec![
                "from-gitignore",
                "from-discovery",
                "from-pattern",
                "from-explicit",
                "from-cli"
            ]
        );
        assert_eq!(
            resolver.rules().loaded_files(),
            [".gitignore", ".dockerignore", "extra.rules", "explicit.txt"]
        );
    }

    #[test]
    fn test_no_auto_ignore_skips_discovery() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "a\n").unwrap();
        fs::write(root.join(".npmignore"), "b\n").unwrap();

        let sources = IgnoreSources {
            auto_ignore: false,
            ..IgnoreSources::default()
        };
        let resolver = sources.build_resolver(root).unwrap();
        assert_eq!(resolver.rules().len(), 1);
        assert_eq!(resolver.rules().loaded_files(), [".gitignore"]);
    }

    #[test]
    fn test_missing_explicit_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let sources = IgnoreSources {
            ignore_files: vec![temp_dir.path().join("nope.ignore")],
            ..IgnoreSources::default()
        };
        let resolver = sources.build_resolver(temp_dir.path()).unwrap();
        assert!(resolver.rules().is_empty());
    }
}
