//! Gitignore-style exclusion rules
//!
//! - [`pattern`]: glob matching of one pattern against one path
//! - [`rules`]: parsing ignore files into an ordered [`RuleStore`]
//! - [`resolver`]: last-match-wins decisions for paths under a root
//! - [`sources`]: multi-source loading policy for a session

pub mod pattern;
pub mod resolver;
pub mod rules;
pub mod sources;

pub use pattern::{matches, IgnorePattern};
pub use resolver::IgnoreResolver;
pub use rules::{
    discover_ignore_files, parse_line, IgnoreRule, LoadOutcome, RuleStore,
    CONVENTIONAL_IGNORE_FILES,
};
pub use sources::IgnoreSources;
