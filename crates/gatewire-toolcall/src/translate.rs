use serde_json::{Value as JsonValue, json};

use crate::error::ToolParseError;
use crate::types::{Tool, ToolCallFormat};

/// Round-trip converters between the internal `Tool` definition and each
/// provider's tool-declaration wire shape. All three carry the same three
/// facts — name, description, input schema — under different field names
/// and nesting, so translation is a pure reshape with no information loss.
pub fn to_anthropic(tool: &Tool) -> JsonValue {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.input_schema,
    })
}

pub fn from_anthropic(value: &JsonValue) -> Result<Tool, ToolParseError> {
    read_tool(value, "name", "description", "input_schema", ToolCallFormat::Anthropic)
}

pub fn to_openai(tool: &Tool) -> JsonValue {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

pub fn from_openai(value: &JsonValue) -> Result<Tool, ToolParseError> {
    let function = value.get("function").ok_or_else(|| ToolParseError::Malformed {
        format: ToolCallFormat::OpenAi,
        reason: "missing \"function\" object".to_string(),
    })?;
    read_tool(function, "name", "description", "parameters", ToolCallFormat::OpenAi)
}

pub fn to_google(tool: &Tool) -> JsonValue {
    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.input_schema,
    })
}

pub fn from_google(value: &JsonValue) -> Result<Tool, ToolParseError> {
    read_tool(value, "name", "description", "parameters", ToolCallFormat::Google)
}

fn read_tool(
    value: &JsonValue,
    name_key: &str,
    description_key: &str,
    schema_key: &str,
    format: ToolCallFormat,
) -> Result<Tool, ToolParseError> {
    let name = value
        .get(name_key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| ToolParseError::Malformed {
            format,
            reason: format!("missing \"{name_key}\""),
        })?
        .to_string();
    let description = value
        .get(description_key)
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();
    let input_schema = value.get(schema_key).cloned().unwrap_or(json!({}));
    Ok(Tool {
        name,
        description,
        input_schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tool() -> Tool {
        Tool {
            name: "get_weather".to_string(),
            description: "Look up current weather".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"],
            }),
        }
    }

    #[test]
    fn anthropic_to_openai_to_anthropic_round_trips() {
        let tool = sample_tool();
        let openai_json = to_openai(&to_anthropic_as_tool(&tool));
        let recovered = from_openai(&openai_json).unwrap();
        assert_eq!(recovered, tool);
    }

    #[test]
    fn anthropic_to_google_round_trips() {
        let tool = sample_tool();
        let google_json = to_google(&tool);
        let recovered = from_google(&google_json).unwrap();
        assert_eq!(recovered, tool);
    }

    fn to_anthropic_as_tool(tool: &Tool) -> Tool {
        let anthropic_json = to_anthropic(tool);
        from_anthropic(&anthropic_json).unwrap()
    }
}
