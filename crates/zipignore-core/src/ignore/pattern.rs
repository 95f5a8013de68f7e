//! Glob matching of ignore patterns against relative paths
//!
//! Patterns use the `glob` crate's shell syntax:
//! - `*` matches any run of characters except `/`
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]`, `[!abc]` character classes (`[^abc]` is the same as `[!abc]`)
//! - `**` matches across directory separators when it is a whole segment;
//!   anywhere else it acts like `*`
//! - `\x` matches `x` literally
//!
//! Leading dots are matched by wildcards, as in ignore files.

use glob::{MatchOptions, Pattern};
use tracing::warn;

/// Options used for every ignore-pattern match
pub const IGNORE_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Rewrite ignore-file glob syntax into what `glob::Pattern` accepts
///
/// An unterminated `[` is left alone so the pattern still fails to compile.
fn normalize_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => match chars.get(i + 1) {
                Some(&escaped) => {
                    push_literal(&mut out, escaped);
                    i += 2;
                }
                None => {
                    out.push('\\');
                    i += 1;
                }
            },
            '*' => {
                let start = i;
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                let segment_start = start == 0 || chars[start - 1] == '/';
                let segment_end = i == chars.len() || chars[i] == '/';
                if i - start >= 2 && segment_start && segment_end {
                    out.push_str("**");
                } else {
                    out.push('*');
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut body = i + 1;
                    if chars[body] == '^' {
                        out.push('!');
                        body += 1;
                    }
                    out.extend(&chars[body..=end]);
                    i = end + 1;
                }
                None => {
                    out.extend(&chars[i..]);
                    break;
                }
            },
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Index of the `]` closing the class opened at `open`
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if matches!(chars.get(i), Some('!') | Some('^')) {
        i += 1;
    }
    // A leading `]` belongs to the set
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    (i..chars.len()).find(|&idx| chars[idx] == ']')
}

fn push_literal(out: &mut String, c: char) {
    match c {
        '?' | '*' | '[' | ']' => {
            out.push('[');
            out.push(c);
            out.push(']');
        }
        _ => out.push(c),
    }
}

/// A pattern compiled once and matched many times
///
/// Malformed globs are kept but never match anything except the exact
/// pattern text, so a single bad line cannot abort rule loading.
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    source: String,
    compiled: Option<Pattern>,
}

impl IgnorePattern {
    /// Compile a pattern
    pub fn new(pattern: &str) -> Self {
        let compiled = match Pattern::new(&normalize_glob(pattern)) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                warn!(pattern, error = %e, "Malformed ignore pattern will never match");
                None
            }
        };

        Self {
            source: pattern.to_string(),
            compiled,
        }
    }

    /// The pattern text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern compiled as a glob
    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    /// Match against the whole candidate path only
    pub fn matches_path(&self, candidate: &str) -> bool {
        if candidate == self.source {
            return true;
        }

        self.compiled
            .as_ref()
            .is_some_and(|pattern| pattern.matches_with(candidate, IGNORE_MATCH_OPTIONS))
    }

    /// Match against the candidate and every suffix left after dropping leading segments
    ///
    /// `a/b/c` is tried as `a/b/c`, `b/c` and `c`, so an unanchored pattern
    /// matches at any depth.
    pub fn matches_any_depth(&self, candidate: &str) -> bool {
        if self.matches_path(candidate) {
            return true;
        }

        candidate
            .match_indices('/')
            .map(|(idx, _)| &candidate[idx + 1..])
            .filter(|suffix| !suffix.is_empty())
            .any(|suffix| self.matches_path(suffix))
    }
}

/// Check whether `candidate` matches `pattern` at any depth
///
/// ```
/// use zipignore_core::ignore::matches;
///
/// assert!(matches("src/debug.log", "*.log"));
/// assert!(matches("a/b/node_modules", "node_modules"));
/// assert!(!matches("a/node_modules_backup", "node_modules"));
/// ```
pub fn matches(candidate: &str, pattern: &str) -> bool {
    IgnorePattern::new(pattern).matches_any_depth(candidate)
}
