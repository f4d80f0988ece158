use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A tool definition offered to the model, independent of any provider's
/// wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

/// A single invocation the model asked for in its response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: JsonValue,
}

/// The provider wire shape a tool call was (or should be) expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallFormat {
    Anthropic,
    OpenAi,
    Google,
    XAi,
    DeepSeek,
}
