//! The release workflow around the reconciliation engine.
//!
//! Everything that touches the outside world goes through two seams:
//! [`CommandExecutor`] for git and the simulator, and [`ConfirmationGate`]
//! for the human in the loop. The steps run strictly in sequence:
//!
//! 1. sync the upstream checkout
//! 2. discover and reconcile the file groups
//! 3. present the plan and ask before copying
//! 4. purge stale files, create directories, copy
//! 5. run the simulation harness
//! 6. remove simulation artifacts
//! 7. read the release version and publish

mod cleanup;
mod confirm;
mod executor;
mod harness;
mod present;
mod publish;
mod repo;
#[cfg(test)]
pub(crate) mod testing;

pub use cleanup::{cleanup_artifacts, remove_path};
pub use confirm::{parse_answer, AutoConfirm, ConfirmationGate, PromptGate};
pub use executor::{
    execute, CommandExecutor, CommandOutput, CommandSpec, DryRunExecutor, SystemExecutor,
};
pub use harness::{count_matches, run_harness, HarnessReport, StepReport};
pub use present::render_plan;
pub use publish::{build_commit_message, publish_release};
pub use repo::sync_upstream;

use crate::config::{ConfigError, ReleaseConfig};
use crate::reconciliation::{
    build_release_plan, execute_plan, ExecutionResult, ReconcileError, ReleasePlan,
};
use crate::template::TemplateError;
use crate::utils::{resolve_path, today};
use crate::version::{find_version_tag, VersionError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("{0}")]
    ReconcileError(#[from] ReconcileError),

    #[error("Version error: {0}")]
    VersionError(#[from] VersionError),

    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[error("Invalid harness pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Invalid cleanup pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Failed to start '{0}': {1}")]
    SpawnFailed(String, #[source] std::io::Error),

    #[error("Command '{command}' exited with code {code}:\n{output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("Harness failed: {passed} passing, {failed} failing")]
    HarnessFailure { passed: u32, failed: u32 },

    #[error("Aborted: {0}")]
    Aborted(String),
}

/// Switches for a release run
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    pub skip_sync: bool,
    pub skip_harness: bool,
    pub skip_publish: bool,
    /// Commit message used instead of the configured template
    pub message: Option<String>,
}

/// What a release run did
#[derive(Debug, Clone, Default)]
pub struct ReleaseSummary {
    pub planned: usize,
    pub execution: ExecutionResult,
    pub harness: Option<HarnessReport>,
    pub cleaned: Vec<PathBuf>,
    pub version: Option<String>,
    pub message: Option<String>,
    pub published: bool,
}

/// Drives a release from sync to publish
pub struct ReleaseWorkflow {
    config: ReleaseConfig,
    work_dir: PathBuf,
    executor: Arc<dyn CommandExecutor>,
    gate: Arc<dyn ConfirmationGate>,
}

impl ReleaseWorkflow {
    pub fn new(
        config: ReleaseConfig,
        work_dir: PathBuf,
        executor: Arc<dyn CommandExecutor>,
        gate: Arc<dyn ConfirmationGate>,
    ) -> Self {
        Self {
            config,
            work_dir,
            executor,
            gate,
        }
    }

    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Clone or update the upstream checkout
    pub async fn sync(&self) -> Result<PathBuf, WorkflowError> {
        sync_upstream(self.executor.as_ref(), &self.config.upstream, &self.work_dir).await
    }

    /// Discover and reconcile every file group
    pub async fn plan(&self) -> Result<ReleasePlan, WorkflowError> {
        Ok(build_release_plan(&self.config, &self.work_dir).await?)
    }

    /// Ask before copying, then apply the plan
    pub async fn apply(&self, plan: &ReleasePlan) -> Result<ExecutionResult, WorkflowError> {
        if plan.is_empty() {
            return Err(WorkflowError::Aborted("no files to copy".to_string()));
        }

        let prompt = format!("Copy {} file(s) into the distribution?", plan.len());
        if !self.gate.confirm(&prompt).await? {
            return Err(WorkflowError::Aborted("copy declined".to_string()));
        }

        Ok(execute_plan(plan).await?)
    }

    /// Run the harness and require a clean result
    pub async fn test(&self) -> Result<HarnessReport, WorkflowError> {
        let report = run_harness(self.executor.as_ref(), &self.config.harness, &self.work_dir).await?;
        report.check()?;

        if self.config.harness.confirm_result && !self.gate.confirm("Simulations ok?").await? {
            return Err(WorkflowError::Aborted("simulation result rejected".to_string()));
        }

        Ok(report)
    }

    /// Remove simulation artifacts
    pub async fn cleanup(&self) -> Result<Vec<PathBuf>, WorkflowError> {
        cleanup_artifacts(&self.config.cleanup, &self.work_dir).await
    }

    /// Read the release version from the distribution tree
    pub async fn version(&self) -> Result<String, WorkflowError> {
        let path = resolve_path(&self.work_dir, &self.config.version.file);
        Ok(find_version_tag(&path, &self.config.version.marker).await?)
    }

    /// Ask, then commit and push.
    ///
    /// Returns whether the release was pushed; a dry run logs the git
    /// commands, keeps the upstream checkout and returns `false`.
    pub async fn publish(&self, message: &str) -> Result<bool, WorkflowError> {
        let remotes: Vec<&str> = self
            .config
            .publish
            .remotes
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        let prompt = format!("Publish \"{message}\" to {}?", remotes.join(", "));
        if !self.gate.confirm(&prompt).await? {
            warn!("Publishing declined");
            return Ok(false);
        }

        let dry_run = self.executor.is_dry_run();

        if self.config.publish.delete_checkout {
            let checkout = resolve_path(&self.work_dir, &self.config.upstream.checkout_dir);
            if dry_run {
                info!(path = %checkout.display(), "Dry run, keeping upstream checkout");
            } else if checkout.exists() {
                info!(path = %checkout.display(), "Deleting upstream checkout");
                remove_path(&checkout).await?;
            }
        }

        publish_release(
            self.executor.as_ref(),
            &self.config.publish,
            &self.work_dir,
            message,
        )
        .await?;
        Ok(!dry_run)
    }

    /// Run the whole release
    pub async fn run(&self, options: &ReleaseOptions) -> Result<ReleaseSummary, WorkflowError> {
        let mut summary = ReleaseSummary::default();

        if options.skip_sync {
            info!("Skipping upstream sync");
        } else {
            self.sync().await?;
        }

        let plan = self.plan().await?;
        println!("{}", render_plan(&plan));
        summary.planned = plan.len();
        summary.execution = self.apply(&plan).await?;

        if options.skip_harness {
            info!("Skipping simulation harness");
        } else {
            summary.harness = Some(self.test().await?);
        }

        summary.cleaned = self.cleanup().await?;

        let version = self.version().await?;
        let message = match &options.message {
            Some(message) => message.clone(),
            None => build_commit_message(&self.config.publish, &version, &today())?,
        };
        info!(version = %version, "Release version");
        summary.version = Some(version);

        if options.skip_publish {
            info!(message = %message, "Skipping publish");
        } else {
            summary.published = self.publish(&message).await?;
        }
        summary.message = Some(message);

        Ok(summary)
    }
}
