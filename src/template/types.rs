use serde::Serialize;

/// Context for commit message templates
/// Placeholders: {{version}}, {{date}}
#[derive(Debug, Clone, Serialize)]
pub struct CommitMessageContext {
    pub version: String,
    pub date: String,
}
