mod discover;
mod entry;
mod execute;
mod matching;
mod plan;

pub use discover::{discover, discover_all};
pub use entry::{base_filename, PathEntry};
pub use execute::{copy_pairs, ensure_target_dirs, execute_plan, purge_stale, ExecutionResult};
pub use matching::{
    filter_by_filename_membership, lookup_candidate, reconcile, reorder_to_match,
    verify_one_to_one, AmbiguityPolicy, MatchedPair,
};
pub use plan::{build_release_plan, plan_group, CopyStatus, GroupPlan, PlannedCopy, ReleasePlan};

use std::fmt::Write;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    PatternError {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read discovered path: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("ERROR! Missing files!\n{}", render_lists(.sources, .targets))]
    CountMismatch {
        sources: Vec<String>,
        targets: Vec<String>,
    },

    #[error("No upstream file for {} target(s):\n{}", .targets.len(), render_list(.targets))]
    Unmatched { targets: Vec<String> },

    #[error("Ambiguous match for '{file_name}':\n{}", render_list(.candidates))]
    AmbiguousMatch {
        file_name: String,
        candidates: Vec<String>,
    },

    #[error("Failed to copy {} -> {}: {io}", .source_path.display(), .target_path.display())]
    CopyError {
        source_path: PathBuf,
        target_path: PathBuf,
        #[source]
        io: std::io::Error,
    },

    #[error(
        "Target {target} is written twice: by group '{first_group}' from {first_source} \
         and by group '{second_group}' from {second_source}"
    )]
    DuplicateTarget {
        target: String,
        first_group: String,
        first_source: String,
        second_group: String,
        second_source: String,
    },

    #[error("Group '{group}': {source}")]
    GroupError {
        group: String,
        #[source]
        source: Box<ReconcileError>,
    },
}

impl ReconcileError {
    /// Attach the name of the file group the error occurred in
    pub fn in_group(self, group: &str) -> Self {
        ReconcileError::GroupError {
            group: group.to_string(),
            source: Box::new(self),
        }
    }
}

fn render_list(items: &[String]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  ({idx}) {item}");
    }
    out
}

/// Both lists enumerated one per line so they can be diffed by eye
fn render_lists(sources: &[String], targets: &[String]) -> String {
    format!(
        "Src {}:\n{}\nTarget {}:\n{}",
        sources.len(),
        render_list(sources),
        targets.len(),
        render_list(targets)
    )
}
