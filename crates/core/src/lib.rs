//! # RustedPrompt Core
//!
//! Domain types, collaborator traits, and error definitions for prompt
//! assembly. It depends only on serde, serde_json, base64 and thiserror,
//! and defines the model every other crate works against.
//!
//! ## Design Philosophy
//!
//! The tokenizer and the turn template are collaborators supplied by the
//! caller. Both are defined as traits here so that:
//! - A real model tokenizer or a cheap heuristic can be swapped in via configuration
//! - Tests can use closures or stub implementations
//! - The assembly crate never reaches for ambient state

pub mod error;
pub mod message;
pub mod template;
pub mod tokenizer;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{AssemblyError, RenderError, TokenizeError};
pub use message::{ImageData, IndexedImage, Message, Role};
pub use template::{TemplateRenderer, Turn};
pub use tokenizer::{TokenId, Tokenizer};
pub use tool::ToolDefinition;
