use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

/// Scans `raw` for every `<tool_call>...</tool_call>` block and extracts
/// `<id>`, `<name>`, and the given arguments tag from each. This is not a
/// general XML parser: the shell is a small fixed shape embedded inside an
/// otherwise textual response, and a real parser would choke on the
/// surrounding prose.
pub(super) fn parse_shell(
    raw: &str,
    args_tag: &str,
    format: ToolCallFormat,
) -> Result<Vec<ToolCall>, ToolParseError> {
    let mut calls = Vec::new();
    let mut cursor = raw;
    while let Some(start) = cursor.find("<tool_call>") {
        let rest = &cursor[start + "<tool_call>".len()..];
        let Some(end) = rest.find("</tool_call>") else {
            return Err(ToolParseError::Malformed {
                format,
                reason: "unterminated <tool_call> block".to_string(),
            });
        };
        let block = &rest[..end];
        let id = extract_tag(block, "id").ok_or_else(|| ToolParseError::Malformed {
            format,
            reason: "missing <id>".to_string(),
        })?;
        let name = extract_tag(block, "name").ok_or_else(|| ToolParseError::Malformed {
            format,
            reason: "missing <name>".to_string(),
        })?;
        let args_raw = extract_tag(block, args_tag).ok_or_else(|| ToolParseError::Malformed {
            format,
            reason: format!("missing <{args_tag}>"),
        })?;
        let args = serde_json::from_str(args_raw.trim()).map_err(|err| ToolParseError::Malformed {
            format,
            reason: format!("<{args_tag}> is not valid JSON: {err}"),
        })?;
        calls.push(ToolCall { id, name, args });
        cursor = &rest[end + "</tool_call>".len()..];
    }
    Ok(calls)
}

fn extract_tag<'a>(block: &'a str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(block[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_multiple_blocks() {
        let raw = "<tool_call><id>1</id><name>a</name><arguments>{}</arguments></tool_call>\
                    <tool_call><id>2</id><name>b</name><arguments>{}</arguments></tool_call>";
        let calls = parse_shell(raw, "arguments", ToolCallFormat::XAi).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].id, "2");
    }

    #[test]
    fn unterminated_block_is_malformed() {
        let raw = "<tool_call><id>1</id>";
        assert!(parse_shell(raw, "arguments", ToolCallFormat::XAi).is_err());
    }
}
