use super::entry::PathEntry;
use super::matching::MatchedPair;
use super::plan::{CopyStatus, ReleasePlan};
use super::ReconcileError;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// Result of executing a release plan
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    pub copied: Vec<String>,
    pub unchanged: Vec<String>,
    pub purged: Vec<String>,
    pub created_dirs: Vec<String>,
}

/// Copy every source over its target, in order.
///
/// Target directories must already exist. The first failure aborts the
/// remaining copies; files copied before it stay in place.
pub async fn copy_pairs(pairs: &[MatchedPair]) -> Result<usize, ReconcileError> {
    for pair in pairs {
        let source = pair.source.as_path();
        let target = pair.target.as_path();

        debug!(source = %source.display(), target = %target.display(), "Copying");
        fs::copy(source, target)
            .await
            .map_err(|io| ReconcileError::CopyError {
                source_path: source.to_path_buf(),
                target_path: target.to_path_buf(),
                io,
            })?;
    }

    Ok(pairs.len())
}

/// Create the missing parent directories of the targets.
///
/// Returns the directories that did not exist before.
pub async fn ensure_target_dirs(pairs: &[MatchedPair]) -> Result<Vec<PathBuf>, ReconcileError> {
    let parents: BTreeSet<PathBuf> = pairs
        .iter()
        .filter_map(|p| p.target.as_path().parent().map(|d| d.to_path_buf()))
        .collect();

    let mut created = Vec::new();
    for dir in parents {
        if !dir.is_dir() {
            fs::create_dir_all(&dir).await?;
            created.push(dir);
        }
    }

    Ok(created)
}

/// Delete targets that no longer have an upstream counterpart
pub async fn purge_stale(stale: &[PathEntry]) -> Result<usize, ReconcileError> {
    for entry in stale {
        info!(path = %entry.path, "Removing stale file");
        fs::remove_file(entry.as_path()).await?;
    }
    Ok(stale.len())
}

/// Execute the plan: purge, create directories, copy changed files.
pub async fn execute_plan(plan: &ReleasePlan) -> Result<ExecutionResult, ReconcileError> {
    let mut result = ExecutionResult::default();

    let stale = plan.stale();
    purge_stale(&stale).await?;
    result.purged = stale.into_iter().map(|e| e.path).collect();

    let all_pairs = plan.pairs();
    result.created_dirs = ensure_target_dirs(&all_pairs)
        .await?
        .into_iter()
        .map(|d| d.to_string_lossy().into_owned())
        .collect();

    let mut to_copy = Vec::new();
    for copy in plan.groups.iter().flat_map(|g| &g.copies) {
        if copy.status == CopyStatus::Unchanged {
            result.unchanged.push(copy.pair.target.path.clone());
        } else {
            to_copy.push(copy.pair.clone());
        }
    }

    let copied = copy_pairs(&to_copy).await?;
    result.copied = to_copy.into_iter().map(|p| p.target.path).collect();

    info!(
        copied,
        unchanged = result.unchanged.len(),
        purged = result.purged.len(),
        "Copied release files"
    );

    Ok(result)
}
