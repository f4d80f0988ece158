use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

/// Same XML shell as xAI, but the arguments tag is `<parameters>`.
pub fn parse(raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    super::xml_shell::parse_shell(raw, "parameters", ToolCallFormat::DeepSeek)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_tool_call() {
        let raw = "<tool_call><id>1</id><name>get_time</name>\
                    <parameters>{}</parameters></tool_call>";
        let calls = parse(raw).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_time");
        assert_eq!(calls[0].args, serde_json::json!({}));
    }
}
