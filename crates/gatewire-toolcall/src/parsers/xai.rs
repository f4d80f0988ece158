use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

/// xAI embeds tool calls as an XML shell inside the textual response rather
/// than a JSON array: `<tool_call><id>..</id><name>..</name><arguments>..</arguments></tool_call>`.
pub fn parse(raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    super::xml_shell::parse_shell(raw, "arguments", ToolCallFormat::XAi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_tool_call() {
        let raw = "Let me check.\n<tool_call><id>1</id><name>get_weather</name>\
                    <arguments>{\"city\":\"sf\"}</arguments></tool_call>\nDone.";
        let calls = parse(raw).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "1");
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].args, serde_json::json!({"city": "sf"}));
    }
}
