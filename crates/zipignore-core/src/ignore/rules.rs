//! Parsing of ignore-file lines into rules and the ordered rule store

use super::pattern::{IgnorePattern, IGNORE_MATCH_OPTIONS};
use crate::{Error, Result};
use glob::Pattern;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ignore files consulted in every source directory, in load order
pub const CONVENTIONAL_IGNORE_FILES: [&str; 3] = [".gitignore", ".zipignore", ".ignore"];

/// A single parsed ignore rule
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pattern: IgnorePattern,
    negate: bool,
    directory_only: bool,
    anchored: bool,
}

impl IgnoreRule {
    /// Parse one ignore-file line
    ///
    /// Returns `None` for blank lines, comments, and lines with nothing left
    /// once the `!` prefix and the leading and trailing slashes are stripped.
    pub fn parse(raw: &str) -> Option<Self> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negate, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let trimmed = rest.trim_end_matches('/');
        let directory_only = trimmed.len() != rest.len();
        let pattern = trimmed.trim_start_matches('/');
        let anchored = pattern.len() != trimmed.len();

        if pattern.is_empty() {
            return None;
        }

        Some(Self {
            pattern: IgnorePattern::new(pattern),
            negate,
            directory_only,
            anchored,
        })
    }

    /// Pattern text with markers stripped
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Rule re-includes what it matches (`!` prefix)
    pub fn negate(&self) -> bool {
        self.negate
    }

    /// Rule only applies to directories (trailing `/`)
    pub fn directory_only(&self) -> bool {
        self.directory_only
    }

    /// Rule was written with a leading `/`
    pub fn anchored(&self) -> bool {
        self.anchored
    }

    /// Whether the pattern compiled as a glob
    pub fn is_valid(&self) -> bool {
        self.pattern.is_valid()
    }

    /// Match a root-relative, forward-slash path
    ///
    /// Anchored rules are matched at any depth unless `strict_anchoring`
    /// is set, in which case they only match the full relative path.
    pub fn matches(&self, relative: &str, strict_anchoring: bool) -> bool {
        if self.anchored && strict_anchoring {
            self.pattern.matches_path(relative)
        } else {
            self.pattern.matches_any_depth(relative)
        }
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            f.write_str("!")?;
        }
        if self.anchored {
            f.write_str("/")?;
        }
        f.write_str(self.pattern.as_str())?;
        if self.directory_only {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// Parse one ignore-file line, see [`IgnoreRule::parse`]
pub fn parse_line(raw: &str) -> Option<IgnoreRule> {
    IgnoreRule::parse(raw)
}

/// Result of loading a single ignore file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// File was read; `rules` new rules were appended
    Loaded { rules: usize },
    /// File does not exist
    Missing,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Ordered collection of ignore rules plus the names of files they came from
///
/// Rules are only ever appended; later rules override earlier ones when
/// both match the same path.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<IgnoreRule>,
    loaded_files: Vec<String>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules in insertion order
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// Base names of ignore files loaded so far, without duplicates
    pub fn loaded_files(&self) -> &[String] {
        &self.loaded_files
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parse and append a single pattern; returns whether a rule was added
    pub fn add_pattern(&mut self, raw: &str) -> bool {
        match IgnoreRule::parse(raw) {
            Some(rule) => {
                self.rules.push(rule);
                true
            }
            None => false,
        }
    }

    /// Parse every line of `content` and append the resulting rules
    pub fn add_lines(&mut self, content: &str) -> usize {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let before = self.rules.len();
        self.rules.extend(content.lines().filter_map(IgnoreRule::parse));
        self.rules.len() - before
    }

    /// Load an ignore file
    ///
    /// A missing file is not an error. Loading the same file twice appends
    /// its rules twice but records its name once.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadOutcome> {
        let path = path.as_ref();

        if path.is_dir() {
            return Err(Error::InvalidPath(format!(
                "Ignore file is a directory: {:?}",
                path
            )));
        }

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "Ignore file not found, skipping");
                return Ok(LoadOutcome::Missing);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let added = self.add_lines(&String::from_utf8_lossy(&bytes));

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        if !self.loaded_files.contains(&name) {
            self.loaded_files.push(name);
        }

        debug!(path = ?path, rules = added, "Loaded ignore file");
        Ok(LoadOutcome::Loaded { rules: added })
    }

    /// Load each named file from `base_dir` in order; returns how many existed
    pub fn load_named_files<S: AsRef<str>>(&mut self, base_dir: &Path, names: &[S]) -> Result<usize> {
        let mut loaded = 0;
        for name in names {
            if self.load_file(base_dir.join(name.as_ref()))?.is_loaded() {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Load `.gitignore`, `.zipignore` and `.ignore` from `base_dir`
    pub fn load_conventional_files(&mut self, base_dir: &Path) -> Result<usize> {
        self.load_named_files(base_dir, &CONVENTIONAL_IGNORE_FILES)
    }

    /// Load the conventional files, then every other `.*ignore` file in `base_dir`
    ///
    /// Discovered files are loaded in directory-listing order, which depends
    /// on the filesystem.
    pub fn load_default_files(&mut self, base_dir: &Path) -> Result<usize> {
        let mut loaded = self.load_conventional_files(base_dir)?;
        for path in discover_ignore_files(base_dir, &CONVENTIONAL_IGNORE_FILES) {
            if self.load_file(&path)?.is_loaded() {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Load every file in `base_dir` whose name matches `glob_pattern`
    ///
    /// A malformed glob or an unreadable directory loads nothing.
    pub fn load_files_by_pattern(&mut self, base_dir: &Path, glob_pattern: &str) -> Result<usize> {
        let pattern = match Pattern::new(glob_pattern) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(pattern = glob_pattern, error = %e, "Invalid ignore-file pattern");
                return Ok(0);
            }
        };

        let mut loaded = 0;
        for path in list_files(base_dir, |name| pattern.matches_with(name, IGNORE_MATCH_OPTIONS)) {
            if self.load_file(&path)?.is_loaded() {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Drop every rule and loaded-file record
    pub fn clear(&mut self) {
        self.rules.clear();
        self.loaded_files.clear();
    }
}

/// Files in `base_dir` named `.<something>ignore`, minus `exclude`
pub fn discover_ignore_files<S: AsRef<str>>(base_dir: &Path, exclude: &[S]) -> Vec<PathBuf> {
    list_files(base_dir, |name| {
        name.starts_with('.')
            && name.ends_with("ignore")
            && !exclude.iter().any(|excluded| excluded.as_ref() == name)
    })
}

fn list_files<F>(dir: &Path, mut keep: F) -> Vec<PathBuf>
where
    F: FnMut(&str) -> bool,
{
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = ?dir, error = %e, "Cannot list directory for ignore files");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| keep(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   \t").is_none());
        assert!(parse_line("# comment").is_none());
        assert!(parse_line("   # indented comment").is_none());
    }

    #[test]
    fn test_parse_plain() {
        let rule = parse_line("  *.log  ").unwrap();
        assert_eq!(rule.pattern(), "*.log");
        assert!(!rule.negate());
        assert!(!rule.directory_only());
        assert!(!rule.anchored());
    }

    #[test]
    fn test_parse_markers() {
        let rule = parse_line("!/build/").unwrap();
        assert_eq!(rule.pattern(), "build");
        assert!(rule.negate());
        assert!(rule.directory_only());
        assert!(rule.anchored());
        assert_eq!(rule.to_string(), "!/build/");
    }

    #[test]
    fn test_parse_only_markers() {
        assert!(parse_line("/").is_none());
        assert!(parse_line("!").is_none());
        assert!(parse_line("!/").is_none());
    }

    #[test]
    fn test_parse_never_leaves_edge_slashes() {
        let rule = parse_line("//tmp//").unwrap();
        assert_eq!(rule.pattern(), "tmp");
        assert!(rule.anchored());
        assert!(rule.directory_only());
    }

    #[test]
    fn test_add_lines_handles_crlf_and_bom() {
        let mut store = RuleStore::new();
        let added = store.add_lines("\u{feff}*.log\r\n\r\n# note\r\ndist/\r\n");
        assert_eq!(added, 2);
        assert_eq!(store.rules()[0].pattern(), "*.log");
        assert_eq!(store.rules()[1].pattern(), "dist");
        assert!(store.rules()[1].directory_only());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        let outcome = store.load_file(temp_dir.path().join(".gitignore")).unwrap();
        assert_eq!(outcome, LoadOutcome::Missing);
        assert!(store.is_empty());
        assert!(store.loaded_files().is_empty());
    }

    #[test]
    fn test_load_directory_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = RuleStore::new();
        assert!(matches!(
            store.load_file(temp_dir.path()),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_load_twice_duplicates_rules_not_names() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".gitignore");
        fs::write(&path, "*.log\n!keep.log\n").unwrap();

        let mut store = RuleStore::new();
        assert_eq!(store.load_file(&path).unwrap(), LoadOutcome::Loaded { rules: 2 });
        assert_eq!(store.load_file(&path).unwrap(), LoadOutcome::Loaded { rules: 2 });
        assert_eq!(store.len(), 4);
        assert_eq!(store.loaded_files(), [".gitignore".to_string()]);
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".zipignore");
        fs::write(&path, "target/\n").unwrap();

        let mut store = RuleStore::new();
        store.load_file(&path).unwrap();
        store.add_pattern("*.tmp");
        store.clear();
        assert!(store.is_empty());
        assert!(store.loaded_files().is_empty());
    }

    #[test]
    fn test_discover_ignore_files() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();
        fs::write(base.join(".gitignore"), "").unwrap();
        fs::write(base.join(".dockerignore"), "").unwrap();
        fs::write(base.join(".npmignore"), "").unwrap();
        fs::write(base.join("notignore"), "").unwrap();
        fs::write(base.join(".ignored"), "").unwrap();
        fs::create_dir(base.join(".dirignore")).unwrap();

        let mut found: Vec<String> = discover_ignore_files(base, &CONVENTIONAL_IGNORE_FILES)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();
        assert_eq!(found, vec![".dockerignore", ".npmignore"]);
    }

    #[test]
    fn test_discover_unreadable_dir_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(discover_ignore_files(&missing, &CONVENTIONAL_IGNORE_FILES).is_empty());
    }
}
