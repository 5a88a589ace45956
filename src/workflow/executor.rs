use super::WorkflowError;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// An external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// A non-zero exit is logged instead of failing the run
    pub allow_fail: bool,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            allow_fail: false,
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What a finished command produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr
    pub stdout: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external programs (git, the simulator) for the workflow
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run the command to completion. A non-zero exit is not an error here;
    /// see [`execute`].
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, WorkflowError>;

    /// True when commands are only logged. Local side effects outside the
    /// executor must be skipped as well.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Run a command and turn a non-zero exit into `CommandFailed` unless the
/// command allows failure.
pub async fn execute(
    executor: &dyn CommandExecutor,
    spec: &CommandSpec,
) -> Result<CommandOutput, WorkflowError> {
    let output = executor.run(spec).await?;

    if !output.success() {
        if spec.allow_fail {
            warn!(command = %spec, code = output.exit_code, "Command failed (allowed)");
        } else {
            return Err(WorkflowError::CommandFailed {
                command: spec.to_string(),
                code: output.exit_code,
                output: output.stdout,
            });
        }
    }

    Ok(output)
}

/// Spawns real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

#[async_trait]
impl CommandExecutor for SystemExecutor {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, WorkflowError> {
        debug!(command = %spec, cwd = ?spec.cwd, "Running command");

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let output = command
            .output()
            .await
            .map_err(|e| WorkflowError::SpawnFailed(spec.to_string(), e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            stdout: text,
            // Killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Logs commands instead of running them
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

#[async_trait]
impl CommandExecutor for DryRunExecutor {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, WorkflowError> {
        info!(command = %spec, cwd = ?spec.cwd, "Dry run, not executing");
        Ok(CommandOutput::default())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
