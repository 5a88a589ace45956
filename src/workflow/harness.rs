//! Simulation smoke test run after the copy.
//!
//! Each configured step is a command. Without result patterns a step is a
//! single test that passes when the command exits zero; with patterns the
//! counts are read from the command output.

use super::executor::{CommandExecutor, CommandSpec};
use super::WorkflowError;
use crate::config::{HarnessConfig, HarnessStep};
use crate::utils::resolve_path;
use regex::Regex;
use std::path::Path;
use tracing::{error, info};

/// Outcome of one harness step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub name: String,
    pub passed: u32,
    pub failed: u32,
    pub exit_code: i32,
}

/// Outcome of the whole harness
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessReport {
    pub steps: Vec<StepReport>,
}

impl HarnessReport {
    pub fn passed(&self) -> u32 {
        self.steps.iter().map(|s| s.passed).sum()
    }

    pub fn failed(&self) -> u32 {
        self.steps.iter().map(|s| s.failed).sum()
    }

    /// Fail unless at least one test passed and none failed
    pub fn check(&self) -> Result<(), WorkflowError> {
        if self.passed() == 0 || self.failed() != 0 {
            return Err(WorkflowError::HarnessFailure {
                passed: self.passed(),
                failed: self.failed(),
            });
        }
        Ok(())
    }
}

/// Sum the first capture group of every match of `pattern` in `text`
pub fn count_matches(pattern: &Regex, text: &str) -> u32 {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .sum()
}

fn compile(pattern: Option<&String>) -> Result<Option<Regex>, WorkflowError> {
    pattern.map(|p| Regex::new(p)).transpose().map_err(WorkflowError::from)
}

async fn run_step(
    executor: &dyn CommandExecutor,
    step: &HarnessStep,
    work_dir: &Path,
) -> Result<StepReport, WorkflowError> {
    let passed_re = compile(step.passed_pattern.as_ref())?;
    let failed_re = compile(step.failed_pattern.as_ref())?;

    let cwd = match &step.cwd {
        Some(dir) => resolve_path(work_dir, dir),
        None => work_dir.to_path_buf(),
    };
    let spec = CommandSpec::new(&step.program, step.args.iter().cloned())
        .in_dir(cwd)
        .allow_fail();

    info!(step = %step.name, command = %spec, "Running harness step");
    let output = executor.run(&spec).await?;

    let passed = match &passed_re {
        Some(re) => count_matches(re, &output.stdout),
        None => u32::from(output.success()),
    };
    let mut failed = match &failed_re {
        Some(re) => count_matches(re, &output.stdout),
        None => 0,
    };
    if !output.success() && failed == 0 {
        failed = 1;
    }

    if failed > 0 {
        error!(step = %step.name, code = output.exit_code, "Harness step failed:\n{}", output.stdout);
    }

    Ok(StepReport {
        name: step.name.clone(),
        passed,
        failed,
        exit_code: output.exit_code,
    })
}

/// Run every step in order and collect the counts.
///
/// All steps run even after a failure so the report is complete; call
/// [`HarnessReport::check`] to turn it into a verdict.
pub async fn run_harness(
    executor: &dyn CommandExecutor,
    harness: &HarnessConfig,
    work_dir: &Path,
) -> Result<HarnessReport, WorkflowError> {
    let mut report = HarnessReport::default();

    for step in &harness.steps {
        report.steps.push(run_step(executor, step, work_dir).await?);
    }

    info!(
        passed = report.passed(),
        failed = report.failed(),
        "Harness finished"
    );
    Ok(report)
}
