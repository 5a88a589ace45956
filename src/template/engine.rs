use handlebars::Handlebars;
use thiserror::Error;

use super::types::CommitMessageContext;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Create an engine rendering plain text.
    ///
    /// Strict mode turns a misspelt placeholder into an error instead of
    /// an empty string in the commit message.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);
        Self { handlebars }
    }

    /// Render a commit message from a template string
    pub fn render_commit_message(
        &self,
        template: &str,
        context: &CommitMessageContext,
    ) -> Result<String, TemplateError> {
        self.handlebars
            .render_template(template, context)
            .map_err(TemplateError::from)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
