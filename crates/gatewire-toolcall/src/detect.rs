use crate::types::ToolCallFormat;

/// Cheap substring heuristics over the raw response body, used before any
/// JSON or XML parsing is attempted. Order matters: the XML shell is shared
/// between xAI and DeepSeek, distinguished only by the inner tag.
pub fn detect(raw: &str) -> Option<ToolCallFormat> {
    if raw.contains("\"content\":[{\"type\":\"tool_use\"") || raw.contains("\"type\": \"tool_use\"")
    {
        return Some(ToolCallFormat::Anthropic);
    }
    if raw.contains("\"tool_calls\":") && raw.contains("\"choices\":[") {
        return Some(ToolCallFormat::OpenAi);
    }
    if raw.contains("\"functionCall\"") && raw.contains("\"candidates\":[") {
        return Some(ToolCallFormat::Google);
    }
    if raw.contains("<tool_call>") {
        if raw.contains("<parameters>") {
            return Some(ToolCallFormat::DeepSeek);
        }
        if raw.contains("<arguments>") {
            return Some(ToolCallFormat::XAi);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_anthropic() {
        let raw = r#"{"content":[{"type":"tool_use","id":"1","name":"get_weather","input":{}}]}"#;
        assert_eq!(detect(raw), Some(ToolCallFormat::Anthropic));
    }

    #[test]
    fn detects_openai() {
        let raw = r#"{"choices":[{"message":{"tool_calls":[{"id":"1"}]}}]}"#;
        assert_eq!(detect(raw), Some(ToolCallFormat::OpenAi));
    }

    #[test]
    fn detects_google() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"functionCall":{"name":"f"}}]}}]}"#;
        assert_eq!(detect(raw), Some(ToolCallFormat::Google));
    }

    #[test]
    fn detects_xai_vs_deepseek_by_inner_tag() {
        let xai = "<tool_call><id>1</id><name>f</name><arguments>{}</arguments></tool_call>";
        let deepseek = "<tool_call><id>1</id><name>f</name><parameters>{}</parameters></tool_call>";
        assert_eq!(detect(xai), Some(ToolCallFormat::XAi));
        assert_eq!(detect(deepseek), Some(ToolCallFormat::DeepSeek));
    }

    #[test]
    fn unrecognized_payload_yields_none() {
        assert_eq!(detect("plain text response"), None);
    }
}
