use gatewire_toolcall::ToolCallFormat;

use super::openai_like::{OpenAiLikeProvider, ToolCallStyle};

/// xAI speaks the OpenAI chat-completions shape but returns tool calls as
/// `<tool_call>...<arguments>...</arguments></tool_call>` inside the
/// message content rather than a native `tool_calls` array.
pub fn build(base_url: impl Into<String>, auth_method: impl Into<String>, auth_header: Option<String>) -> OpenAiLikeProvider {
    OpenAiLikeProvider::new(
        "xai",
        base_url,
        auth_method,
        auth_header,
        ToolCallStyle::EmbeddedXml(ToolCallFormat::XAi),
    )
}
