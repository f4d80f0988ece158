use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

#[derive(Debug, Deserialize)]
struct Envelope {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: JsonValue,
}

/// `candidates[0].content.parts[*].functionCall`; Google never assigns a
/// call id, so one is synthesized.
pub fn parse(raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    let envelope: Envelope = serde_json::from_str(raw).map_err(|err| ToolParseError::Malformed {
        format: ToolCallFormat::Google,
        reason: err.to_string(),
    })?;
    let Some(candidate) = envelope.candidates.into_iter().next() else {
        return Ok(Vec::new());
    };
    Ok(candidate
        .content
        .parts
        .into_iter()
        .filter_map(|part| part.function_call)
        .map(|call| ToolCall {
            id: Uuid::new_v4().to_string(),
            name: call.name,
            args: call.args,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_an_id_for_each_call() {
        let raw = r#"{"candidates":[{"content":{"parts":[
            {"functionCall":{"name":"get_weather","args":{"city":"sf"}}}
        ]}}]}"#;
        let calls = parse(raw).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert!(!calls[0].id.is_empty());
    }

    #[test]
    fn text_only_part_is_skipped() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#;
        assert_eq!(parse(raw).unwrap(), Vec::new());
    }
}
