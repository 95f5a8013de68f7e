//! Common assertions for zipignore testing

use anyhow::Result;
use std::fs::File;
use std::path::Path;
use walkdir::WalkDir;

/// Relative, `/`-separated paths of every file under `dir`, sorted
pub fn relative_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir)?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }
    files.sort();
    Ok(files)
}

/// Entry names stored in a ZIP archive, sorted
pub fn zip_entry_names(archive: &Path) -> Result<Vec<String>> {
    let mut zip = zip::ZipArchive::new(File::open(archive)?)?;
    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        names.push(zip.by_index(i)?.name().to_string());
    }
    names.sort();
    Ok(names)
}

/// Asserts that a ZIP archive holds exactly `expected`, in any order
pub fn assert_zip_contains_exactly(archive: &Path, expected: &[&str]) -> Result<()> {
    let names = zip_entry_names(archive)?;
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(names, expected, "Archive entries mismatch for {:?}", archive);
    Ok(())
}

/// Asserts that every file under `expected` exists under `actual` with equal content
pub fn assert_files_match(expected: &Path, actual: &Path) -> Result<()> {
    for name in relative_files(expected)? {
        let left = std::fs::read(expected.join(&name))?;
        let right = std::fs::read(actual.join(&name))?;
        assert_eq!(left, right, "Content mismatch for {}", name);
    }
    Ok(())
}

/// Asserts that a file has specific permissions (Unix only)
#[cfg(unix)]
pub fn assert_file_permissions(path: &Path, expected: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    assert_eq!(
        mode, expected,
        "Permission mismatch for {:?}: expected {:o}, got {:o}",
        path, expected, mode
    );
    Ok(())
}
