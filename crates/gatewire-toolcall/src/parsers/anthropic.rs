use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

#[derive(Debug, Deserialize)]
struct Envelope {
    content: Vec<Block>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    ToolUse {
        id: String,
        name: String,
        input: JsonValue,
    },
    #[serde(other)]
    Other,
}

/// `content[*].type == "tool_use"`; args are already a JSON object.
pub fn parse(raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(|err| ToolParseError::Malformed {
        format: ToolCallFormat::Anthropic,
        reason: err.to_string(),
    })?;
    Ok(envelope
        .content
        .into_iter()
        .filter_map(|block| match block {
            Block::ToolUse { id, name, input } => Some(ToolCall {
                id,
                name,
                args: input,
            }),
            Block::Other => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_tool_use_block() {
        let raw = r#"{"content":[
            {"type":"text","text":"let me check"},
            {"type":"tool_use","id":"toolu_1","name":"get_weather","input":{"k":"v"}}
        ]}"#;
        let calls = parse(raw).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "toolu_1");
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].args, serde_json::json!({"k": "v"}));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse("{not json").is_err());
    }
}
