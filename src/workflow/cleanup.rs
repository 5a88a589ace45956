use super::WorkflowError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Remove generated simulation artifacts.
///
/// Each pattern is a glob relative to `work_dir` and may name files or
/// directories. Removal is best-effort: a missing artifact is skipped and a
/// failed removal is logged. Returns the removed paths.
pub async fn cleanup_artifacts(
    patterns: &[String],
    work_dir: &Path,
) -> Result<Vec<PathBuf>, WorkflowError> {
    let mut removed = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", Pattern::escape(&work_dir.to_string_lossy()), pattern);
        for path in glob::glob(&full)?.filter_map(Result::ok) {
            match remove_path(&path).await {
                Ok(()) => {
                    info!(path = %path.display(), "Removed artifact");
                    removed.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove artifact"),
            }
        }
    }

    Ok(removed)
}

/// Remove a file or a directory tree
pub async fn remove_path(path: &Path) -> Result<(), std::io::Error> {
    if path.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    }
}
