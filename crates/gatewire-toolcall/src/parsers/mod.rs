mod anthropic;
mod deepseek;
mod google;
mod openai;
mod xai;
mod xml_shell;

use crate::detect::detect;
use crate::error::ToolParseError;
use crate::types::{ToolCall, ToolCallFormat};

/// Parses `raw` using the detected format, or a caller-supplied one when the
/// provider is already known. Detection failure is `ToolParseError::UnknownFormat`,
/// which the router treats as non-fatal: the caller still gets the textual
/// response, just with an empty tool-call list.
pub fn parse(raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    let format = detect(raw).ok_or(ToolParseError::UnknownFormat)?;
    parse_as(format, raw)
}

pub fn parse_as(format: ToolCallFormat, raw: &str) -> Result<Vec<ToolCall>, ToolParseError> {
    match format {
        ToolCallFormat::Anthropic => anthropic::parse(raw),
        ToolCallFormat::OpenAi => openai::parse(raw),
        ToolCallFormat::Google => google::parse(raw),
        ToolCallFormat::XAi => xai::parse(raw),
        ToolCallFormat::DeepSeek => deepseek::parse(raw),
    }
}
