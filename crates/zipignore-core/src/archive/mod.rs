//! Archive operations module
//!
//! Packing consumes the walker's files-only feed, so every ignore rule
//! applies before anything reaches the ZIP writer. Extraction routes each
//! entry name through [`crate::security::sanitize_path`].

pub mod zip;

use crate::config::Config;
use crate::ignore::IgnoreSources;
use crate::utils::absolutize;
use crate::walker::{DirectoryWalker, FileEntry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Archive entry information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Name within the archive, `/`-separated
    pub name: String,
    /// Original size in bytes
    pub size: u64,
    /// Compressed size in bytes
    pub compressed_size: u64,
    /// Whether this is a directory entry
    pub is_dir: bool,
    /// Last modification time as `YYYY-MM-DD HH:MM:SS`, if recorded
    pub modified: Option<String>,
}

/// Options for packing
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Deflate level 0-9; 0 stores entries uncompressed
    pub compression_level: u32,
    /// Where ignore rules come from
    pub sources: IgnoreSources,
    /// Write entries in path order so equal trees give equal archives
    pub sort_entries: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
            sources: IgnoreSources::default(),
            sort_entries: true,
        }
    }
}

impl PackOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            compression_level: config.archive.compression_level,
            sources: IgnoreSources::from_config(&config.ignore),
            ..Self::default()
        }
    }
}

/// Options for extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Replace files that already exist in the output directory
    pub overwrite: bool,
}

impl ExtractOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            overwrite: config.archive.overwrite,
        }
    }
}

/// Summary of a pack operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackReport {
    /// Files written to the archive
    pub files: usize,
    /// Uncompressed bytes written
    pub bytes: u64,
}

/// Summary of an extract operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub extracted: usize,
    pub directories: usize,
    /// Entries whose names would escape the output directory
    pub skipped_unsafe: usize,
    /// Entries not written because the target already existed
    pub skipped_existing: usize,
}

/// Files under `source` that survive the ignore rules
///
/// `exclude` names a path that must never be returned, normally the archive
/// being written. This is the list [`pack`] archives and what a dry run shows.
pub fn collect_files<P: AsRef<Path>>(
    source: P,
    exclude: Option<&Path>,
    options: &PackOptions,
) -> Result<Vec<FileEntry>> {
    let source = absolutize(source);
    if !source.exists() {
        return Err(Error::InvalidPath(format!(
            "Source path does not exist: {:?}",
            source
        )));
    }
    if !source.is_dir() {
        return Err(Error::InvalidPath(format!(
            "Source path is not a directory: {:?}",
            source
        )));
    }

    let resolver = options.sources.build_resolver(&source)?;
    let mut files = DirectoryWalker::new(&resolver)
        .sort_by_name(options.sort_entries)
        .files_only(&source)?;

    if let Some(exclude) = exclude {
        let exclude = absolutize(exclude);
        let canonical = exclude.canonicalize().ok();
        files.retain(|entry| {
            let same = entry.absolute_path == exclude
                || (canonical.is_some()
                    && entry.absolute_path.file_name() == exclude.file_name()
                    && entry.absolute_path.canonicalize().ok() == canonical);
            if same {
                debug!(path = ?entry.absolute_path, "Skipping output archive");
            }
            !same
        });
    }

    Ok(files)
}

/// Pack the non-ignored files of `source` into a ZIP archive at `output`
pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    output: Q,
    options: &PackOptions,
) -> Result<PackReport> {
    let source = source.as_ref();
    let output = output.as_ref();
    info!("Packing {:?} to {:?}", source, output);

    let files = collect_files(source, Some(output), options)?;
    let report = zip::pack_zip(&files, output, options.compression_level)?;

    info!(
        files = report.files,
        bytes = report.bytes,
        "Created {:?}",
        output
    );
    Ok(report)
}

/// Extract a ZIP archive into `output_dir`
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
    archive: P,
    output_dir: Q,
    options: &ExtractOptions,
) -> Result<ExtractReport> {
    let archive = archive.as_ref();
    let output_dir = output_dir.as_ref();
    info!("Extracting {:?} to {:?}", archive, output_dir);

    let report = zip::extract_zip(archive, output_dir, options)?;

    info!(
        extracted = report.extracted,
        skipped = report.skipped_unsafe + report.skipped_existing,
        "Extraction complete"
    );
    Ok(report)
}

/// List archive contents without extracting
pub fn list<P: AsRef<Path>>(archive: P) -> Result<Vec<ArchiveEntry>> {
    zip::list_zip(archive.as_ref())
}
