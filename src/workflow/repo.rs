use super::executor::{execute, CommandExecutor, CommandSpec};
use super::WorkflowError;
use crate::config::UpstreamConfig;
use crate::utils::resolve_path;
use std::path::{Path, PathBuf};
use tracing::info;

/// Bring the upstream checkout to the configured ref.
///
/// Clones into the checkout directory when it is missing, otherwise checks
/// out the ref and pulls. Returns the checkout path.
pub async fn sync_upstream(
    executor: &dyn CommandExecutor,
    upstream: &UpstreamConfig,
    work_dir: &Path,
) -> Result<PathBuf, WorkflowError> {
    let checkout = resolve_path(work_dir, &upstream.checkout_dir);

    if checkout.is_dir() {
        info!(path = %checkout.display(), "Updating upstream repository");
        execute(
            executor,
            &CommandSpec::new("git", ["checkout", upstream.reference.as_str()]).in_dir(&checkout),
        )
        .await?;
        execute(
            executor,
            &CommandSpec::new("git", ["pull", upstream.url.as_str(), upstream.reference.as_str()])
                .in_dir(&checkout),
        )
        .await?;
    } else {
        info!(url = %upstream.url, path = %checkout.display(), "Cloning upstream repository");
        let target = checkout.to_string_lossy().into_owned();
        execute(
            executor,
            &CommandSpec::new("git", ["clone", upstream.url.as_str(), target.as_str()])
                .in_dir(work_dir),
        )
        .await?;
        execute(
            executor,
            &CommandSpec::new("git", ["checkout", upstream.reference.as_str()]).in_dir(&checkout),
        )
        .await?;
    }

    Ok(checkout)
}
