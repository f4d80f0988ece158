use gatewire_toolcall::ToolCallFormat;

use super::openai_like::{OpenAiLikeProvider, ToolCallStyle};

/// DeepSeek speaks the OpenAI chat-completions shape but returns tool calls
/// as `<tool_call>...<parameters>...</parameters></tool_call>` inside the
/// message content.
pub fn build(base_url: impl Into<String>, auth_method: impl Into<String>, auth_header: Option<String>) -> OpenAiLikeProvider {
    OpenAiLikeProvider::new(
        "deepseek",
        base_url,
        auth_method,
        auth_header,
        ToolCallStyle::EmbeddedXml(ToolCallFormat::DeepSeek),
    )
}
