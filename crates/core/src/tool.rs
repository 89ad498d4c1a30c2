//! Tool descriptors forwarded to the turn template.
//!
//! The assembler does not interpret tools. Templates that advertise
//! function calling receive them with every turn.

use serde::{Deserialize, Serialize};

/// A tool definition the model may be told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    #[serde(default)]
    pub description: String,

    /// JSON Schema describing the tool's parameters
    #[serde(default)]
    pub parameters: serde_json::Value,
}
