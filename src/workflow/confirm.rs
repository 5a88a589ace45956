use super::WorkflowError;
use async_trait::async_trait;
use std::io::{self, Write};
use tracing::info;

/// Gates the steps of a release on a yes/no decision
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, prompt: &str) -> Result<bool, WorkflowError>;
}

/// Answers every prompt with the same value (`--yes`, CI runs)
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl ConfirmationGate for AutoConfirm {
    async fn confirm(&self, prompt: &str) -> Result<bool, WorkflowError> {
        info!(prompt, answer = self.0, "Auto-answered confirmation");
        Ok(self.0)
    }
}

/// Asks on the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptGate;

#[async_trait]
impl ConfirmationGate for PromptGate {
    async fn confirm(&self, prompt: &str) -> Result<bool, WorkflowError> {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || prompt_confirm(&prompt))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Interrupted, e))??;
        Ok(answer)
    }
}

/// Interpret an answer: `Some(true)` for yes, `Some(false)` for no,
/// `None` for anything else.
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompt until the user answers y or n. End of input counts as no.
fn prompt_confirm(prompt: &str) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();
        print!("{prompt} [Y/N] ? ");
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(false);
        }

        if let Some(answer) = parse_answer(&input) {
            return Ok(answer);
        }
    }
}
