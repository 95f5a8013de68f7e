//! Plain-text rendering for `list` and `rules`

use std::fmt::{self, Write};
use std::path::Path;
use zipignore_core::archive::ArchiveEntry;
use zipignore_core::ignore::RuleStore;

const RULE: &str = "──────────────────────────────────────────────────";

/// Render archive contents in archive order
pub fn format_listing(archive: &Path, entries: &[ArchiveEntry]) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Contents of {}:", archive.display())?;
    writeln!(out, "{}", RULE)?;
    for entry in entries {
        if entry.is_dir {
            writeln!(out, "[dir]  {}", entry.name)?;
        } else {
            writeln!(
                out,
                "[file] {}  {} bytes{}",
                entry.name,
                entry.size,
                entry
                    .modified
                    .as_deref()
                    .map(|m| format!("  {}", m))
                    .unwrap_or_default()
            )?;
        }
    }
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Total entries: {}", entries.len())?;
    Ok(out)
}

/// Render the loaded files and rules in evaluation order
pub fn format_rules(directory: &Path, rules: &RuleStore) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Ignore rules for: {}", directory.display())?;
    writeln!(out, "{}", RULE)?;

    if !rules.loaded_files().is_empty() {
        writeln!(out, "Loaded ignore files: {}", rules.loaded_files().join(", "))?;
        writeln!(out, "{}", RULE)?;
    }

    if rules.is_empty() {
        writeln!(out, "No ignore rules found")?;
    } else {
        for rule in rules.rules() {
            let prefix = if rule.negate() { "!" } else { "-" };
            let mut notes = String::new();
            if rule.directory_only() {
                notes.push_str(" (directories only)");
            }
            if rule.anchored() {
                notes.push_str(" (anchored)");
            }
            if !rule.is_valid() {
                notes.push_str(" (invalid pattern, never matches)");
            }
            writeln!(out, "{} {}{}", prefix, rule.pattern(), notes)?;
        }
    }

    writeln!(out, "{}", RULE)?;
    writeln!(out, "Total rules: {}", rules.len())?;
    Ok(out)
}
