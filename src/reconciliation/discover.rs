use super::entry::PathEntry;
use super::ReconcileError;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn compile(pattern: &str) -> Result<Pattern, ReconcileError> {
    Pattern::new(pattern).map_err(|source| ReconcileError::PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

/// Discover the files under `root` matching `pattern`.
///
/// `**` descends recursively. Directories are skipped, as is every file
/// whose name matches one of the `exclude` patterns. Results are sorted.
pub fn discover(
    root: &Path,
    pattern: &str,
    exclude: &[String],
) -> Result<Vec<PathEntry>, ReconcileError> {
    let excluded = exclude
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>, _>>()?;

    let full_pattern = format!(
        "{}/{}",
        Pattern::escape(&root.to_string_lossy()),
        pattern
    );

    let paths = glob::glob_with(&full_pattern, MATCH_OPTIONS).map_err(|source| {
        ReconcileError::PatternError {
            pattern: full_pattern.clone(),
            source,
        }
    })?;

    let mut entries = Vec::new();
    for path in paths {
        let path = path?;
        if !path.is_file() {
            continue;
        }

        let entry = PathEntry::from_path(&path, root);
        if excluded
            .iter()
            .any(|p| p.matches_with(&entry.file_name, MATCH_OPTIONS))
        {
            debug!(path = %entry.path, "Excluded by pattern");
            continue;
        }
        entries.push(entry);
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(root = %root.display(), pattern, found = entries.len(), "Discovered files");
    Ok(entries)
}

/// Discover every pattern in turn, dropping paths already found by an
/// earlier pattern.
pub fn discover_all(
    root: &Path,
    patterns: &[String],
    exclude: &[String],
) -> Result<Vec<PathEntry>, ReconcileError> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for pattern in patterns {
        for entry in discover(root, pattern, exclude)? {
            if seen.insert(entry.path.clone()) {
                entries.push(entry);
            }
        }
    }

    Ok(entries)
}
