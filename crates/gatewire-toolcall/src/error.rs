#[derive(Debug, thiserror::Error)]
pub enum ToolParseError {
    #[error("response did not match any known tool-call wire format")]
    UnknownFormat,
    #[error("malformed {format:?} tool-call payload: {reason}")]
    Malformed {
        format: crate::types::ToolCallFormat,
        reason: String,
    },
}
