use serde::Deserialize;

use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

#[derive(Debug, Deserialize)]
struct Envelope {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    tool_calls: Vec<RawToolCall>,
}

#[derive(Debug, Deserialize)]
struct RawToolCall {
    id: String,
    function: Function,
}

#[derive(Debug, Deserialize)]
struct Function {
    name: String,
    arguments: String,
}

/// `choices[0].message.tool_calls[]`, with `function.arguments` encoded as a
/// JSON string rather than an inline object.
pub fn parse(raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(|err| ToolParseError::Malformed {
        format: ToolCallFormat::OpenAi,
        reason: err.to_string(),
    })?;
    let Some(choice) = envelope.choices.into_iter().next() else {
        return Ok(Vec::new());
    };
    choice
        .message
        .tool_calls
        .into_iter()
        .map(|raw_call| {
            let args = serde_json::from_str(&raw_call.function.arguments).map_err(|err| {
                ToolParseError::Malformed {
                    format: ToolCallFormat::OpenAi,
                    reason: format!("arguments not valid JSON: {err}"),
                }
            })?;
            Ok(ToolCall {
                id: raw_call.id,
                name: raw_call.function.name,
                args,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_tool_calls() {
        let raw = r#"{"choices":[{"message":{"tool_calls":[
            {"id":"call_1","type":"function","function":{"name":"get_weather","arguments":"{\"city\":\"sf\"}"}},
            {"id":"call_2","type":"function","function":{"name":"get_weather","arguments":"{\"city\":\"nyc\"}"}},
            {"id":"call_3","type":"function","function":{"name":"get_time","arguments":"{}"}}
        ]}}]}"#;
        let calls = parse(raw).unwrap();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].args, serde_json::json!({"city": "sf"}));
        assert_eq!(calls[2].name, "get_time");
    }

    #[test]
    fn no_tool_calls_yields_empty_vec() {
        let raw = r#"{"choices":[{"message":{"content":"hi"}}]}"#;
        assert_eq!(parse(raw).unwrap(), Vec::new());
    }
}
