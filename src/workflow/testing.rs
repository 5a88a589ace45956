use super::executor::{CommandExecutor, CommandOutput, CommandSpec};
use super::WorkflowError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every command and answers from a queue of canned outputs.
///
/// Commands beyond the queue succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<CommandSpec>>,
    responses: Mutex<Vec<(String, CommandOutput)>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the first command whose rendering contains `needle`
    pub fn respond(&self, needle: &str, output: CommandOutput) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push((needle.to_string(), output));
        }
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Rendered command lines, in execution order
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(|c| c.to_string()).collect()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, WorkflowError> {
        let line = spec.to_string();
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(spec.clone());
        }

        let mut responses = match self.responses.lock() {
            Ok(responses) => responses,
            Err(_) => return Ok(CommandOutput::default()),
        };
        match responses.iter().position(|(needle, _)| line.contains(needle.as_str())) {
            Some(idx) => Ok(responses.remove(idx).1),
            None => Ok(CommandOutput::default()),
        }
    }
}
