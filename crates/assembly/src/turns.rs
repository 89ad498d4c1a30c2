//! Turn building — folds a flat message list into rendered turns.
//!
//! The builder accumulates into one [`Turn`] and flushes it to the template
//! whenever the next message would break the field order
//! system → prompt → response:
//!
//! | Incoming | Flush first when | Then merge into |
//! |----------|------------------|-----------------|
//! | system | prompt or response is set | `system` |
//! | user | response is set | `prompt` |
//! | assistant | response is set | `response` |
//!
//! Merging into a field that already holds text joins with a blank line.
//! Rendered turns are concatenated with no separator.

use rustedprompt_core::{Message, RenderError, Role, TemplateRenderer, ToolDefinition, Turn};
use tracing::debug;

const MERGE_SEPARATOR: &str = "\n\n";

/// Explicit accumulator for the turn currently being built.
pub struct TurnBuilder<'a> {
    template: &'a dyn TemplateRenderer,
    tools: &'a [ToolDefinition],
    current: Turn,
    output: String,
    flushed: usize,
}

impl<'a> TurnBuilder<'a> {
    pub fn new(template: &'a dyn TemplateRenderer, tools: &'a [ToolDefinition]) -> Self {
        Self {
            template,
            tools,
            current: Turn::default(),
            output: String::new(),
            flushed: 0,
        }
    }

    /// Whether a message with `role` must start a new turn.
    pub fn needs_flush(&self, role: Role) -> bool {
        match role {
            Role::System => !self.current.prompt.is_empty() || !self.current.response.is_empty(),
            Role::User | Role::Assistant => !self.current.response.is_empty(),
        }
    }

    /// Fold one message into the current turn.
    pub fn push(&mut self, message: &Message) -> Result<(), RenderError> {
        if self.needs_flush(message.role) {
            self.flush()?;
        }

        let field = match message.role {
            Role::System => &mut self.current.system,
            Role::User => &mut self.current.prompt,
            Role::Assistant => &mut self.current.response,
        };
        merge(field, &message.content);
        Ok(())
    }

    /// Render the current turn, append it to the output, and reset.
    fn flush(&mut self) -> Result<(), RenderError> {
        let turn = std::mem::take(&mut self.current);
        let rendered = self.template.render(&turn, self.tools)?;
        self.output.push_str(&rendered);
        self.flushed += 1;
        Ok(())
    }

    /// Flush whatever is pending and return the concatenated prompt.
    ///
    /// A builder that never saw a message still renders one empty turn;
    /// the template decides what that produces.
    pub fn finish(mut self) -> Result<String, RenderError> {
        if !self.current.is_empty() || self.flushed == 0 {
            self.flush()?;
        }
        debug!(turns = self.flushed, "Rendered turns");
        Ok(self.output)
    }
}

fn merge(field: &mut String, text: &str) {
    if !field.is_empty() {
        field.push_str(MERGE_SEPARATOR);
    }
    field.push_str(text);
}
