//! Error types for the RustedPrompt domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error enum; assembly wraps both.

use thiserror::Error;

// --- Bounded context errors ---

/// Failure reported by a [`Tokenizer`](crate::tokenizer::Tokenizer).
#[derive(Debug, Clone, Error)]
pub enum TokenizeError {
    #[error("Tokenization failed: {0}")]
    Failed(String),

    #[error("Tokenizer unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a [`TemplateRenderer`](crate::template::TemplateRenderer).
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Template rendering failed: {0}")]
    Failed(String),

    #[error("Invalid template: {0}")]
    Template(String),
}

/// Errors that abort a single prompt assembly. No partial prompt is
/// returned alongside any of these.
#[derive(Debug, Clone, Error)]
pub enum AssemblyError {
    #[error("{0}")]
    Tokenize(#[from] TokenizeError),

    #[error("{0}")]
    Render(#[from] RenderError),
}
