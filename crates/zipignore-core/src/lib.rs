//! zipignore - gitignore-aware directory archiving
//!
//! The heart of this library is the ignore-rule engine in [`ignore`] and the
//! pruning traversal in [`walker`]. [`archive`] packs the walker's output into
//! ZIP files and extracts them again behind the path guard in [`security`].

pub mod archive;
pub mod config;
pub mod error;
pub mod ignore;
pub mod security;
pub mod utils;
pub mod walker;

pub use error::{Error, Result};

// Re-export commonly used types
pub use archive::{
    collect_files, extract, list, pack, ArchiveEntry, ExtractOptions, ExtractReport, PackOptions,
    PackReport,
};
pub use config::Config;
pub use ignore::{IgnoreResolver, IgnoreRule, IgnoreSources, LoadOutcome, RuleStore};
pub use walker::{DirectoryWalker, FileEntry, Walk};
