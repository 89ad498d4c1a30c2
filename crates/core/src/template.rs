//! Turn template abstraction.
//!
//! A model's chat template renders one *turn* at a time: an optional system
//! block, the user's prompt, and the assistant's response. The assembler
//! concatenates rendered turns verbatim, so any spacing between turns is
//! the template's responsibility.

use crate::error::RenderError;
use crate::tool::ToolDefinition;
use serde::{Deserialize, Serialize};

/// The values a turn template is rendered with. Empty strings mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub system: String,
    pub prompt: String,
    pub response: String,
}

impl Turn {
    pub fn new(
        system: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            response: response.into(),
        }
    }

    /// True when no field has been set.
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.prompt.is_empty() && self.response.is_empty()
    }
}

/// Renders a single turn.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, turn: &Turn, tools: &[ToolDefinition]) -> Result<String, RenderError>;
}

/// Any `Fn(&Turn, &[ToolDefinition]) -> Result<String, RenderError>` is a renderer.
impl<F> TemplateRenderer for F
where
    F: Fn(&Turn, &[ToolDefinition]) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, turn: &Turn, tools: &[ToolDefinition]) -> Result<String, RenderError> {
        self(turn, tools)
    }
}
