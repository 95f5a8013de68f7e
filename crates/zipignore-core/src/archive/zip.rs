//! ZIP reading and writing

use super::{ArchiveEntry, ExtractOptions, ExtractReport, PackReport};
use crate::security::{ensure_within, is_safe_entry_name, sanitize_path};
use crate::walker::FileEntry;
use crate::{Error, Result};
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipArchive, ZipWriter};
use chrono::{Datelike, Local, Timelike};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;
use tempfile::Builder;
use tracing::{debug, warn};

/// Highest Deflate level accepted
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Write `files` into a new ZIP archive at `output`
///
/// The archive is assembled in a temporary file next to `output` and moved
/// into place once complete, so a failed pack never leaves a truncated file.
/// A replaced archive keeps its mode; a new one gets the default file mode
/// under the process umask.
pub fn pack_zip(files: &[FileEntry], output: &Path, compression_level: u32) -> Result<PackReport> {
    if compression_level > MAX_COMPRESSION_LEVEL {
        return Err(Error::Config(format!(
            "Compression level must be between 0 and {}, got {}",
            MAX_COMPRESSION_LEVEL, compression_level
        )));
    }

    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Same directory as the output so the final rename stays on one filesystem
    let mut builder = Builder::new();
    builder.prefix(".zipignore-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut temp = builder.tempfile_in(parent)?;
    let previous_permissions = fs::metadata(output)
        .ok()
        .filter(|metadata| metadata.is_file())
        .map(|metadata| metadata.permissions());

    let mut report = PackReport::default();
    {
        let mut writer = ZipWriter::new(temp.as_file_mut());

        for entry in files {
            // Links are stored as the file they point to
            let metadata = if entry.is_symlink() {
                match fs::metadata(&entry.absolute_path) {
                    Ok(target) if target.is_file() => target,
                    _ => {
                        warn!(path = ?entry.absolute_path, "Skipping symlink that does not point to a file");
                        continue;
                    }
                }
            } else {
                entry.metadata.clone()
            };

            writer.start_file(
                entry.relative_path.as_str(),
                file_options(compression_level, &metadata),
            )?;
            let mut file = File::open(&entry.absolute_path)?;
            report.bytes += io::copy(&mut file, &mut writer)?;
            report.files += 1;
            debug!("Added {}", entry.relative_path);
        }

        writer.finish()?;
    }

    temp.persist(output).map_err(|e| Error::Io(e.error))?;
    if let Some(permissions) = previous_permissions {
        fs::set_permissions(output, permissions)?;
    }

    Ok(report)
}

fn file_options(compression_level: u32, metadata: &Metadata) -> SimpleFileOptions {
    let mut options = if compression_level == 0 {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(compression_level)))
    };

    options = options.large_file(metadata.len() >= u64::from(u32::MAX));

    if let Some(modified) = zip_datetime(metadata) {
        options = options.last_modified_time(modified);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options = options.unix_permissions(metadata.permissions().mode() & 0o777);
    }

    options
}

/// Local modification time in the DOS range ZIP can store
fn zip_datetime(metadata: &Metadata) -> Option<::zip::DateTime> {
    let modified: chrono::DateTime<Local> = metadata.modified().ok()?.into();
    ::zip::DateTime::from_date_and_time(
        u16::try_from(modified.year()).ok()?,
        modified.month() as u8,
        modified.day() as u8,
        modified.hour() as u8,
        modified.minute() as u8,
        modified.second() as u8,
    )
    .ok()
}

/// Extract every safe entry of `archive` into `output_dir`
pub fn extract_zip(
    archive: &Path,
    output_dir: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport> {
    if !archive.exists() {
        return Err(Error::NotFound(format!("ZIP file not found: {:?}", archive)));
    }

    fs::create_dir_all(output_dir)?;
    let canonical_output = output_dir.canonicalize()?;

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;
    let mut report = ExtractReport::default();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_string();

        // Names are checked lexically first, then against what is on disk
        if entry.enclosed_name().is_none() || !is_safe_entry_name(&name) {
            warn!("Skipping potentially dangerous path: {}", name);
            report.skipped_unsafe += 1;
            continue;
        }
        let target = match sanitize_path(output_dir, Path::new(&name)) {
            Ok(target) => target,
            Err(e) => {
                warn!("Skipping potentially dangerous path: {} ({})", name, e);
                report.skipped_unsafe += 1;
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            if let Err(e) = ensure_within(&canonical_output, &target) {
                warn!("Skipping potentially dangerous path: {} ({})", name, e);
                report.skipped_unsafe += 1;
                continue;
            }
            report.directories += 1;
            debug!("Created directory: {}", name);
            continue;
        }

        if target.exists() && !options.overwrite {
            warn!("File exists, skipping: {}", name);
            report.skipped_existing += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
            // A link swapped in since the name was checked would show up here
            if let Err(e) = ensure_within(&canonical_output, parent) {
                warn!("Skipping potentially dangerous path: {} ({})", name, e);
                report.skipped_unsafe += 1;
                continue;
            }
        }
        let mut output_file = File::create(&target)?;
        io::copy(&mut entry, &mut output_file)?;

        // Only permission bits; setuid and friends are dropped
        #[cfg(unix)]
        {
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))?;
            }
        }

        report.extracted += 1;
        debug!("Extracted: {}", name);
    }

    Ok(report)
}

/// Read the central directory of `archive`
pub fn list_zip(archive: &Path) -> Result<Vec<ArchiveEntry>> {
    if !archive.exists() {
        return Err(Error::NotFound(format!("ZIP file not found: {:?}", archive)));
    }

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index_raw(i)?;
        entries.push(ArchiveEntry {
            name: entry.name().to_string(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
            is_dir: entry.is_dir(),
            modified: entry.last_modified().map(|dt| {
                format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    dt.year(),
                    dt.month(),
                    dt.day(),
                    dt.hour(),
                    dt.minute(),
                    dt.second()
                )
            }),
        });
    }

    Ok(entries)
}
